//! PKCS#12 certificate provisioning.
//!
//! Reads a `.pfx` container, completes its chain with
//! [`pfxchain_resolver`], and stores the result as a PEM bundle (private key
//! followed by the chain) under a key derived from the file's path and
//! modification time.
//!
//! # Example
//!
//! ```rust,ignore
//! use pfxchain_client::HttpFetcher;
//! use pfxchain_provision::{FileStorage, PfxConfig, PfxProvider};
//!
//! let config = PfxConfig::new("/etc/ssl/site.pfx").password("secret");
//! let provider = PfxProvider::provision(
//!     config,
//!     FileStorage::new("/var/cache/pfxchain"),
//!     HttpFetcher::new()?,
//! )
//! .await?;
//!
//! let bundle = provider.get_certificate().await?;
//! std::fs::write("site.pem", bundle.encode())?;
//! ```

mod bundle;
mod cache_key;
mod config;
mod credential;
mod directive;
mod provider;
mod storage;

pub use bundle::{Bundle, KeyFormat};
pub use cache_key::{cache_key, CHAIN_SUFFIX, FULL_CHAIN_SUFFIX};
pub use config::PfxConfig;
pub use credential::Credential;
pub use directive::{parse_directive, DIRECTIVE};
pub use provider::PfxProvider;
pub use storage::{BlobStore, FileStorage, MemoryStorage};
