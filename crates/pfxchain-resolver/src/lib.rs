//! Certificate chain resolution.
//!
//! Given a leaf and whatever intermediates came with it, [`ChainResolver`]
//! downloads missing issuers from the `caIssuers` URLs each certificate
//! advertises until nothing is left unresolved.
//!
//! ## Data Flow
//!
//! ```text
//! input certificates ──track──▶ Worklist (entries whose issuer is unseen)
//!        │                          │ oldest entry first
//!        ▼                          ▼
//!   output chain ◀──append── fetch each issuer URL in order
//!                                   │
//!                                   └──track──▶ Worklist (may satisfy others,
//!                                                may queue its own issuer)
//! ```
//!
//! Resolution ends when the worklist is empty, or early when a bound in
//! [`ResolveOptions`] is hit. Neither case is an error: a chain that never
//! reaches a root is simply shorter.
//!
//! # Example
//!
//! ```rust,ignore
//! use pfxchain_client::HttpFetcher;
//! use pfxchain_resolver::{ChainResolver, ResolveOptions};
//!
//! let resolver = ChainResolver::with_options(
//!     HttpFetcher::new()?,
//!     ResolveOptions::default().max_fetches(16),
//! );
//! let resolved = resolver.resolve(vec![leaf, bundled_intermediate]).await?;
//! for cert in resolved.certificates() {
//!     print!("{}", cert.to_pem());
//! }
//! ```

mod options;
mod resolver;
mod worklist;

pub use options::{ResolveOptions, DEFAULT_MAX_FETCHES};
pub use resolver::{resolve_chain, ChainResolver, ResolvedChain, StopReason};
pub use worklist::{ResolutionEntry, Worklist};
