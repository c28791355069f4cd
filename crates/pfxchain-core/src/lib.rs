//! Core types for assembling certificate chains.
//!
//! This crate provides the foundational types used across pfxchain:
//!
//! - **Certificates**: [`Certificate`] keeps the fields chain assembly reads
//!   (subject/authority key ids, `caIssuers` URLs) alongside the raw DER
//! - **Identifiers**: [`KeyId`] with "empty never matches" equality
//! - **Errors**: Comprehensive error handling with [`ChainError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use pfxchain_core::{Certificate, Result};
//!
//! fn describe(pem: &[u8]) -> Result<()> {
//!     let cert = Certificate::from_pem(pem)?;
//!     println!("SKI: {}", cert.subject_key_id());
//!     println!("Issuer URLs: {:?}", cert.issuing_certificate_urls());
//!     Ok(())
//! }
//! ```

mod certificate;
mod error;
mod key_id;

pub use certificate::{encode_pem, parse_fetched, Certificate, PEM_CERTIFICATE};
pub use error::{ChainError, Result};
pub use key_id::KeyId;
