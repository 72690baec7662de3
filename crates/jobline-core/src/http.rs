//! Shared HTTP client and tokio runtime.
//!
//! Requests are async reqwest under the hood but callers get a sync interface
//! through `SHARED_RUNTIME.handle().block_on(..)`; the pipeline is sequential.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request HTTP settings
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Whole-request timeout (send + body)
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("jobline/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_timeout_is_ten_seconds() {
        assert_eq!(HttpConfig::default().request_timeout, Duration::from_secs(10));
    }
}
