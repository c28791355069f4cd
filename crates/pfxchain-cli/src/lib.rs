//! # pfxchain-cli
//!
//! Command-line interface for certificate chain completion.
//!
//! ## Commands
//!
//! - **resolve**: read PEM or DER certificates and download missing issuers
//! - **bundle**: turn a PKCS#12 file into a cached key + chain PEM bundle
//! - **inspect**: summarise an existing bundle
//!
//! Every command supports `--output pretty|json|pem`.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
