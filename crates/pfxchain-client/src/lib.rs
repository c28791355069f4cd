//! HTTP fetcher for issuer certificates.
//!
//! This crate provides [`HttpFetcher`], the network side of chain
//! resolution, and the [`IssuerFetcher`] trait the resolver is written
//! against so tests and embedders can substitute their own source.

mod client;
mod config;
mod fetcher;

pub use client::{HttpFetcher, HttpFetcherBuilder};
pub use config::*;
pub use fetcher::IssuerFetcher;
pub use pfxchain_core::{ChainError, Result};
