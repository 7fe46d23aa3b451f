//! CTI Intel - Threat-intelligence provider clients.
//!
//! This crate wraps the external services a scan consults behind a single
//! [`IntelProvider`] trait:
//!
//! - [`VirusTotalProvider`] - primary provider, supports every target type
//! - [`AbuseIpDbProvider`] - reputation provider, IP addresses only
//!
//! Provider failures never escape a scan. [`IntelProvider::query`] folds them
//! into the payload itself:
//!
//! ```text
//! lookup() ── Ok(body) ──────────────────────────► body
//!          ── Err(UnsupportedTarget) ────────────► {"message": "..."}
//!          ── Err(network / timeout / parse) ────► {"error": "..."}
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cti_core::{classify, AppConfig};
//! use cti_intel::{IntelProvider, VirusTotalProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let virustotal = VirusTotalProvider::new(&config.virustotal)?;
//!
//! let target = "example.com";
//! let report = virustotal.query(target, classify(target)).await;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod provider;
pub mod providers;
pub mod threat;

// Re-export commonly used types
pub use error::{IntelError, Result};
pub use provider::{IntelProvider, UNSUPPORTED_TARGET_MESSAGE};
pub use providers::{AbuseIpDbProvider, VirusTotalProvider};
pub use threat::ThreatLevel;
