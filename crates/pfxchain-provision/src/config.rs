//! Settings for one PKCS#12 certificate source.

use pfxchain_core::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the PFX lives and how to turn it into a bundle.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PfxConfig {
    /// Path to the .pfx / .p12 file. Required.
    #[serde(default)]
    pub path: PathBuf,

    /// Password protecting the container.
    #[serde(default)]
    pub password: String,

    /// Download missing issuers (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_full_chain: Option<bool>,

    /// Directory for generated bundles (default: the platform cache dir).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl PfxConfig {
    /// Config for `path` with every other field defaulted
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the container password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Enable or disable issuer downloads
    #[must_use]
    pub const fn with_full_chain(mut self, enabled: bool) -> Self {
        self.fetch_full_chain = Some(enabled);
        self
    }

    /// Whether missing issuers are downloaded
    #[must_use]
    pub fn fetch_full_chain(&self) -> bool {
        self.fetch_full_chain.unwrap_or(true)
    }

    /// Reject configurations that cannot be provisioned.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ChainError::Config("path is required".into()));
        }
        Ok(())
    }

    /// Parse and validate TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ChainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ChainError::io(path, e))?;
        Self::from_toml(&content)
    }
}

impl std::fmt::Debug for PfxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PfxConfig")
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .field("fetch_full_chain", &self.fetch_full_chain)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}
