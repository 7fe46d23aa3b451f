//! Provider implementations.

pub mod abuseipdb;
pub mod common;
pub mod virustotal;

pub use abuseipdb::AbuseIpDbProvider;
pub use virustotal::VirusTotalProvider;
