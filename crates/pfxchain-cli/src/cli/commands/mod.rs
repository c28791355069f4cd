//! Command implementations.

pub mod bundle;
pub mod inspect;
pub mod resolve;

use pfxchain::{CancellationToken, FetchConfig, HttpFetcher, HttpFetcherBuilder, ResolveOptions};
use std::time::Duration;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration file
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,

    /// Per-request download timeout
    pub timeout: Duration,

    /// Issuer URL attempts allowed per chain
    pub max_fetches: usize,

    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
}

impl Context {
    /// Download settings from flags and the config file.
    pub fn fetch_config(&self) -> FetchConfig {
        let mut fetch = FetchConfig::default().timeout(self.timeout);
        if let Some(limit) = self.config.max_body_size {
            fetch = fetch.max_body_size(limit);
        }
        if let Some(agent) = &self.config.user_agent {
            fetch.user_agent.clone_from(agent);
        }
        fetch
    }

    /// HTTP fetcher built from [`fetch_config`](Self::fetch_config).
    pub fn fetcher(&self) -> anyhow::Result<HttpFetcher> {
        Ok(HttpFetcherBuilder::from_config(self.fetch_config()).build()?)
    }

    /// Resolution bounds for one chain.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::default()
            .max_fetches(self.max_fetches)
            .cancel_on(self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: Config) -> Context {
        Context {
            config,
            output_format: OutputFormat::Pretty,
            timeout: Duration::from_secs(3),
            max_fetches: 4,
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn fetch_config_takes_flags_and_file_settings() {
        let fetch = context(Config {
            user_agent: Some("site-deploy/1.0".into()),
            max_body_size: Some(4096),
            ..Config::default()
        })
        .fetch_config();

        assert_eq!(fetch.timeout, Duration::from_secs(3));
        assert_eq!(fetch.max_body_size, 4096);
        assert_eq!(fetch.user_agent, "site-deploy/1.0");
    }

    #[test]
    fn fetch_config_defaults() {
        let fetch = context(Config::default()).fetch_config();
        assert_eq!(fetch.max_body_size, pfxchain::DEFAULT_MAX_BODY_SIZE);
        assert!(fetch.user_agent.starts_with("pfxchain/"));
        assert!(context(Config::default()).fetcher().is_ok());
    }
}
