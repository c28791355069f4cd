//! Complete TLS certificate chains by following `caIssuers` links.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pfxchain::{Certificate, ChainResolver, HttpFetcher, ResolveOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> pfxchain::Result<()> {
//!     let leaf = Certificate::from_pem(&std::fs::read("leaf.pem")?)?;
//!
//!     let resolver = ChainResolver::with_options(
//!         HttpFetcher::new()?,
//!         ResolveOptions::default().time_budget(Duration::from_secs(30)),
//!     );
//!     let resolved = resolver.resolve(vec![leaf]).await?;
//!
//!     for cert in resolved.certificates() {
//!         println!("{} (SKI {})", cert.subject(), cert.subject_key_id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS
//! - `provision` - PKCS#12 decoding, PEM bundles and the bundle cache

// Re-export core types
pub use pfxchain_core::*;

// Re-export the fetch boundary
pub use pfxchain_client::{
    FetchConfig, HttpFetcher, HttpFetcherBuilder, IssuerFetcher, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_TIMEOUT,
};

// Re-export the resolver
pub use pfxchain_resolver::{
    resolve_chain, ChainResolver, ResolveOptions, ResolvedChain, StopReason, DEFAULT_MAX_FETCHES,
};

#[cfg(feature = "provision")]
pub use pfxchain_provision as provision;

// Re-export runtime for convenience
pub use tokio;
pub use tokio_util::sync::CancellationToken;
