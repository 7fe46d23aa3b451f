//! CTI Scanner - Scan orchestration.
//!
//! Composes the target classifier, the provider clients and the scan log
//! into the classify → query → persist pipeline behind `POST /api/scan`,
//! and exposes the history and statistics reads.
//!
//! # Pipeline
//!
//! 1. Trim the target; reject it when empty
//! 2. Classify it as `ip`, `domain` or `url`
//! 3. Query the primary provider (always)
//! 4. Query the reputation provider (ip targets only)
//! 5. Append the combined result to the scan log
//!
//! Provider failures are data, not errors: they arrive as `{"error": ...}`
//! payloads inside an otherwise successful outcome.
//!
//! # Example
//!
//! ```rust,ignore
//! use cti_scanner::ScanOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = ScanOrchestrator::new(
//!     Arc::new(virustotal),
//!     Arc::new(abuseipdb),
//!     Arc::new(database),
//! );
//!
//! let outcome = orchestrator.scan("8.8.8.8").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use orchestrator::{ScanOrchestrator, ScanOutcome};
