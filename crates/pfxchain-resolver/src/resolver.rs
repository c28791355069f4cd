//! Chain resolution over the worklist.

use pfxchain_client::IssuerFetcher;
use pfxchain_core::{Certificate, ChainError, Result};
use std::fmt;
use tracing::{debug, warn};

use crate::options::ResolveOptions;
use crate::worklist::Worklist;

/// Why resolution ended before the worklist drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_fetches` issuer URLs were attempted
    FetchLimit,
    /// The deadline passed
    Deadline,
    /// The cancellation token fired
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchLimit => write!(f, "fetch limit reached"),
            Self::Deadline => write!(f, "deadline exceeded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Output of a resolution: the input certificates followed by everything fetched.
#[derive(Debug, Clone)]
pub struct ResolvedChain {
    certificates: Vec<Certificate>,
    input_len: usize,
    attempts: usize,
    stopped: Option<StopReason>,
}

impl ResolvedChain {
    /// Full chain, input order first, then fetched certificates in resolution order
    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Consume into the full chain
    #[must_use]
    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }

    /// Only the certificates downloaded during this resolution
    #[must_use]
    pub fn fetched(&self) -> &[Certificate] {
        &self.certificates[self.input_len..]
    }

    /// Number of issuer URLs attempted, including failures
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Set when a bound cut resolution short
    #[must_use]
    pub const fn stopped(&self) -> Option<StopReason> {
        self.stopped
    }

    /// Returns true if every reachable issuer URL was tried
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

enum Attempt {
    Fetched(Certificate),
    Failed(ChainError),
    Stopped(StopReason),
}

/// Rebuilds certificate chains by downloading missing issuers.
///
/// Each call to [`resolve`](Self::resolve) owns its worklist; one resolver
/// can serve concurrent callers if its fetcher can.
pub struct ChainResolver<F> {
    fetcher: F,
    options: ResolveOptions,
}

impl<F: IssuerFetcher> ChainResolver<F> {
    /// Create a resolver with default bounds
    pub fn new(fetcher: F) -> Self {
        Self::with_options(fetcher, ResolveOptions::default())
    }

    /// Create a resolver with explicit bounds
    pub const fn with_options(fetcher: F, options: ResolveOptions) -> Self {
        Self { fetcher, options }
    }

    /// Bounds applied to each resolution
    pub const fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve the chain for `initial` (leaf first, then any bundled intermediates).
    ///
    /// Unresolved entries are processed oldest first; each entry's URLs are
    /// tried in order and every certificate obtained is both appended to the
    /// output and tracked, so it may satisfy other entries or queue its own
    /// issuer. Per-URL failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Only non-transient errors from the fetcher abort resolution.
    pub async fn resolve(&self, initial: Vec<Certificate>) -> Result<ResolvedChain> {
        let input_len = initial.len();
        let mut worklist = Worklist::new();
        let mut certificates = Vec::with_capacity(input_len);

        for cert in initial {
            worklist.track(&cert);
            certificates.push(cert);
        }
        debug!(input = input_len, pending = worklist.len(), "resolving chain");

        let mut attempts = 0;
        let mut stopped = None;

        'drain: while let Some(entry) = worklist.pop_front() {
            for url in entry.issuing_certificate_urls() {
                if let Some(reason) = self.check_bounds(attempts) {
                    stopped = Some(reason);
                    break 'drain;
                }
                attempts += 1;

                match self.attempt(url).await {
                    Attempt::Fetched(cert) => {
                        debug!(
                            url = %url,
                            ski = %cert.subject_key_id(),
                            aki = %cert.authority_key_id(),
                            "fetched issuer certificate"
                        );
                        worklist.track(&cert);
                        certificates.push(cert);
                    }
                    Attempt::Failed(err) if err.is_transient() => {
                        warn!(url = %url, error = %err, "skipping issuer URL");
                    }
                    Attempt::Failed(err) => return Err(err),
                    Attempt::Stopped(reason) => {
                        stopped = Some(reason);
                        break 'drain;
                    }
                }
            }
        }

        if let Some(reason) = stopped {
            warn!(
                reason = %reason,
                attempts,
                pending = worklist.len(),
                "chain resolution stopped early"
            );
        }

        Ok(ResolvedChain {
            certificates,
            input_len,
            attempts,
            stopped,
        })
    }

    fn check_bounds(&self, attempts: usize) -> Option<StopReason> {
        if self.options.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if self.options.deadline_passed() {
            Some(StopReason::Deadline)
        } else if attempts >= self.options.max_fetches {
            Some(StopReason::FetchLimit)
        } else {
            None
        }
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let fetch = self.fetcher.fetch(url);
        let bounded = async {
            match self.options.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fetch)
                    .await
                    .map_err(|_| StopReason::Deadline),
                None => Ok(fetch.await),
            }
        };

        let outcome = match &self.options.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(StopReason::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        };

        match outcome {
            Ok(Ok(cert)) => Attempt::Fetched(cert),
            Ok(Err(err)) => Attempt::Failed(err),
            Err(reason) => Attempt::Stopped(reason),
        }
    }
}

/// Resolve with a fresh [`ChainResolver`] and default bounds.
pub async fn resolve_chain<F: IssuerFetcher>(
    fetcher: F,
    initial: Vec<Certificate>,
) -> Result<Vec<Certificate>> {
    let resolved = ChainResolver::new(fetcher).resolve(initial).await?;
    Ok(resolved.into_certificates())
}
