//! Core error types for the CTI backend.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dotenv file
    #[error("failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Returned when a stored or submitted target type tag is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown target type '{0}': expected one of ip, domain, url")]
pub struct TargetTypeError(pub String);

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
