//! Fetcher configuration types.

use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on a fetched certificate body (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Settings applied to every issuer certificate request
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for a single request, connect through body
    pub timeout: Duration,

    /// User-Agent header sent to CA servers
    pub user_agent: String,

    /// Largest response body accepted before the URL is abandoned
    pub max_body_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("pfxchain/{}", env!("CARGO_PKG_VERSION")),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl FetchConfig {
    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum body size
    #[must_use]
    pub const fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }
}
