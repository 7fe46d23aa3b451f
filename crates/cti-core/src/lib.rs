//! CTI Core - Foundation crate for the CTI dashboard backend.
//!
//! This crate provides the target classifier, configuration management and
//! the error types that the other CTI crates build on.
//!
//! # Modules
//!
//! - [`error`] - Configuration and parsing errors using thiserror
//! - [`config`] - TOML-based configuration with environment overrides
//! - [`target`] - Target classification (`ip`, `domain`, `url`)
//!
//! # Example
//!
//! ```rust
//! use cti_core::{classify, AppConfig, TargetType};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.server.port, 5000);
//!
//! assert_eq!(classify("8.8.8.8"), TargetType::Ip);
//! assert_eq!(classify("https://example.com/login"), TargetType::Url);
//! assert_eq!(classify("example.com"), TargetType::Domain);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod target;

// Re-export commonly used types
pub use config::{
    read_dotenv, AbuseIpDbConfig, AppConfig, DatabaseConfig, ServerConfig, VirusTotalConfig,
};
pub use error::{ConfigError, ConfigResult, TargetTypeError};
pub use target::{classify, TargetType};
