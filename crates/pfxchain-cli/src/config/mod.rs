//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use pfxchain::provision::PfxConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Per-request timeout for issuer downloads, in seconds.
    pub timeout_secs: Option<u64>,

    /// Maximum issuer URLs tried per chain.
    pub max_fetches: Option<usize>,

    /// Largest issuer certificate download accepted, in bytes.
    pub max_body_size: Option<usize>,

    /// User-Agent sent with issuer downloads.
    pub user_agent: Option<String>,

    /// Default PFX source for `bundle`.
    pub pfx: Option<PfxConfig>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "pfxchain", "pfxchain")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("pfxchain.toml"))
    }

    /// Default directory for generated bundles.
    pub fn cache_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.cache_dir().to_path_buf())
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.output_format.is_none());
        assert!(config.pfx.is_none());
    }

    #[test]
    fn parses_nested_pfx_section() {
        let config = Config::parse(
            r#"
            output_format = "json"
            timeout_secs = 5
            max_fetches = 10
            max_body_size = 65536

            [pfx]
            path = "/etc/ssl/site.pfx"
            password = "secret"
            fetch_full_chain = false
            "#,
        )
        .unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.max_body_size, Some(65536));
        let pfx = config.pfx.unwrap();
        assert_eq!(pfx.path, PathBuf::from("/etc/ssl/site.pfx"));
        assert!(!pfx.fetch_full_chain());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("api_key = \"x\"").is_err());
    }
}
