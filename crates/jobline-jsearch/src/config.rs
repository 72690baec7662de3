//! Fetcher configuration: API credentials and pagination policy

use std::time::Duration;

use crate::runner::FetchError;

/// Environment variable holding the RapidAPI key
pub const KEY_ENV: &str = "RAPIDAPI_KEY";
/// Environment variable holding the RapidAPI host
pub const HOST_ENV: &str = "RAPIDAPI_HOST";

/// RapidAPI credentials sent as static headers on every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub host: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &mask_key(&self.key))
            .field("host", &self.host)
            .finish()
    }
}

impl Credentials {
    /// Both values are required; blank counts as missing.
    pub fn new(key: Option<String>, host: Option<String>) -> Result<Self, FetchError> {
        let key = key
            .filter(|k| !k.trim().is_empty())
            .ok_or(FetchError::MissingCredentials(KEY_ENV))?;
        let host = host
            .filter(|h| !h.trim().is_empty())
            .ok_or(FetchError::MissingCredentials(HOST_ENV))?;
        Ok(Self { key, host })
    }

    /// Read `RAPIDAPI_KEY` / `RAPIDAPI_HOST` from the environment
    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(std::env::var(KEY_ENV).ok(), std::env::var(HOST_ENV).ok())
    }
}

/// Show only the last four characters of an API key
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Delays applied while paging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Fixed pause between consecutive page requests
    pub page_delay: Duration,
    /// Pause before the single retry after HTTP 429
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl FetchPolicy {
    /// No sleeping at all (tests, replayed sources)
    pub const fn immediate() -> Self {
        Self {
            page_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
        }
    }
}
