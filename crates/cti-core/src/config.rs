//! Configuration management for the CTI backend.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The resulting [`AppConfig`] is built once
//! at startup and handed to the provider clients and the database.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CTI_CONFIG";

/// Dotenv file consulted by [`AppConfig::load_with_env`], relative to the
/// working directory.
pub const DOTENV_FILE: &str = ".env";

/// Main application configuration.
///
/// Loaded from `$CTI_CONFIG` or `~/.config/cti-dashboard/config.toml`
/// (or platform equivalent). Missing files and missing sections fall back to
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Scan log storage settings
    pub database: DatabaseConfig,
    /// Primary intelligence provider settings
    pub virustotal: VirusTotalConfig,
    /// Reputation provider settings
    pub abuseipdb: AbuseIpDbConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            Self::from_toml_str(&contents)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `VIRUSTOTAL_API`, `ABUSEIPDB_API`: provider API keys
    /// - `VIRUSTOTAL_URL`, `ABUSEIPDB_URL`: provider base URLs
    /// - `DATABASE_PATH`: scan log database file
    /// - `HOST`, `PORT`: listener address
    ///
    /// Variables missing from the process environment are looked up in
    /// `./.env` when that file exists.
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
        config.apply_env_overrides(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        });
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Numeric values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VIRUSTOTAL_API") {
            self.virustotal.api_key = val;
            tracing::debug!("Override virustotal.api_key from env");
        }

        if let Some(val) = lookup("ABUSEIPDB_API") {
            self.abuseipdb.api_key = val;
            tracing::debug!("Override abuseipdb.api_key from env");
        }

        if let Some(val) = lookup("VIRUSTOTAL_URL") {
            tracing::debug!("Override virustotal.base_url from env: {}", val);
            self.virustotal.base_url = val;
        }

        if let Some(val) = lookup("ABUSEIPDB_URL") {
            tracing::debug!("Override abuseipdb.base_url from env: {}", val);
            self.abuseipdb.base_url = val;
        }

        if let Some(val) = lookup("DATABASE_PATH") {
            tracing::debug!("Override database.path from env: {}", val);
            self.database.path = val;
        }

        if let Some(val) = lookup("HOST") {
            tracing::debug!("Override server.host from env: {}", val);
            self.server.host = val;
        }

        if let Some(val) = lookup("PORT") {
            match val.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::debug!("Override server.port from env: {}", port);
                }
                Err(_) => tracing::debug!("Ignoring unparsable PORT value: {}", val),
            }
        }
    }

    /// Check values that would otherwise fail later in a confusing way.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        for (field, url) in [
            ("virustotal.base_url", &self.virustotal.base_url),
            ("abuseipdb.base_url", &self.abuseipdb.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("expected an http(s) URL, got '{url}'"),
                });
            }
        }

        for (field, secs) in [
            ("virustotal.timeout_secs", self.virustotal.timeout_secs),
            ("abuseipdb.timeout_secs", self.abuseipdb.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// `$CTI_CONFIG` wins; otherwise XDG base directories:
    /// `~/.config/cti-dashboard/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("com", "cti-dashboard", "cti-dashboard")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing file yields no pairs.
///
/// # Errors
/// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
pub fn read_dotenv(path: &Path) -> ConfigResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let pairs = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
    tracing::debug!("Read {} entries from {}", pairs.len(), path.display());
    Ok(pairs)
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Scan log storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` file path, or `:memory:`
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "database.db".to_string(),
        }
    }
}

/// VirusTotal (primary provider) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VirusTotalConfig {
    /// API key sent as the `apikey` query parameter
    pub api_key: String,
    /// Base URL of the v2 API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.virustotal.com/vtapi/v2/".to_string(),
            timeout_secs: 10,
        }
    }
}

/// AbuseIPDB (reputation provider) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbuseIpDbConfig {
    /// API key sent in the `Key` header
    pub api_key: String,
    /// Base URL of the v2 API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Lookback window for reports, `maxAgeInDays`
    pub max_age_days: u32,
}

impl Default for AbuseIpDbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.abuseipdb.com/api/v2/".to_string(),
            timeout_secs: 10,
            max_age_days: 90,
        }
    }
}
