//! Bounds applied to a single resolution.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default ceiling on issuer URL attempts per resolution
pub const DEFAULT_MAX_FETCHES: usize = 64;

/// Limits for one call to [`ChainResolver::resolve`](crate::ChainResolver::resolve).
///
/// Reaching any of them ends resolution early with the chain assembled so
/// far; it is never reported as an error.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum number of issuer URLs tried, successful or not
    pub max_fetches: usize,

    /// Point in time after which no fetch is started or awaited
    pub deadline: Option<Instant>,

    /// External cancellation, checked around every fetch
    pub cancel: Option<CancellationToken>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_fetches: DEFAULT_MAX_FETCHES,
            deadline: None,
            cancel: None,
        }
    }
}

impl ResolveOptions {
    /// Set the fetch ceiling
    #[must_use]
    pub const fn max_fetches(mut self, max: usize) -> Self {
        self.max_fetches = max;
        self
    }

    /// Stop at an absolute deadline
    #[must_use]
    pub const fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop once `budget` has elapsed from now
    #[must_use]
    pub fn time_budget(self, budget: Duration) -> Self {
        self.deadline(Instant::now() + budget)
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub(crate) fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
