//! Target classification.
//!
//! A target is whatever the caller asked us to investigate. Classification is
//! purely syntactic: it decides which provider endpoints apply, nothing more.

use crate::error::TargetTypeError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four dot-separated groups of 1-3 digits.
static IP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").expect("valid IP regex"));

/// Kind of target being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Dotted-quad IPv4 address
    Ip,
    /// Anything that is neither an IP nor a URL
    Domain,
    /// `http://` or `https://` URL
    Url,
}

impl TargetType {
    /// All variants, in the order statistics report them.
    pub const ALL: [Self; 3] = [Self::Ip, Self::Domain, Self::Url];

    /// Lowercase tag used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Domain => "domain",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = TargetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(Self::Ip),
            "domain" => Ok(Self::Domain),
            "url" => Ok(Self::Url),
            other => Err(TargetTypeError(other.to_string())),
        }
    }
}

/// Classify a trimmed, non-empty target.
///
/// Four dot-separated groups of 1-3 digits are an IP. Octet ranges are not
/// checked, so `999.999.999.999` is still an IP. URLs are recognised by a
/// case-sensitive `http://` / `https://` prefix. Everything else is a domain.
#[must_use]
pub fn classify(target: &str) -> TargetType {
    if IP_REGEX.is_match(target) {
        TargetType::Ip
    } else if target.starts_with("http://") || target.starts_with("https://") {
        TargetType::Url
    } else {
        TargetType::Domain
    }
}
