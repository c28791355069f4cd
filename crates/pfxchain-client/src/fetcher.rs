//! The fetch boundary between the resolver and the network.

use async_trait::async_trait;
use pfxchain_core::{Certificate, Result};
use std::sync::Arc;

/// Retrieves the certificate published at an issuer URL.
///
/// Implementations return an error for anything that did not yield exactly
/// one parsable certificate; the resolver treats those as "skip this URL".
#[async_trait]
pub trait IssuerFetcher: Send + Sync {
    /// Download and parse the certificate at `url`
    async fn fetch(&self, url: &str) -> Result<Certificate>;
}

#[async_trait]
impl<F: IssuerFetcher + ?Sized> IssuerFetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<Certificate> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<F: IssuerFetcher + ?Sized> IssuerFetcher for &F {
    async fn fetch(&self, url: &str) -> Result<Certificate> {
        (**self).fetch(url).await
    }
}
