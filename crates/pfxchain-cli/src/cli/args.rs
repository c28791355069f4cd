//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Complete TLS certificate chains from their caIssuers links
///
/// Reads certificates or PKCS#12 files, downloads any issuer certificates
/// that are missing, and prints or caches the assembled chain.
#[derive(Parser, Debug)]
#[command(name = "pfxchain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Per-request timeout for issuer downloads, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of issuer URLs tried per chain
    #[arg(long, global = true, value_name = "N")]
    pub max_fetches: Option<usize>,

    /// Configuration file (default: platform config dir)
    #[arg(short, long, env = "PFXCHAIN_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Complete the chain for certificate files (PEM bundles or DER)
    Resolve(ResolveArgs),

    /// Build the cached key + chain bundle for a PFX file
    Bundle(BundleArgs),

    /// Summarise a PEM bundle
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Certificate files, leaf first
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// PKCS#12 file (overrides the config file)
    #[arg(long, value_name = "PATH")]
    pub pfx: Option<PathBuf>,

    /// Password for the PKCS#12 file
    #[arg(long, env = "PFXCHAIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read a `pfx { ... }` directive from a server config snippet
    #[arg(long, value_name = "FILE", conflicts_with = "pfx")]
    pub directive: Option<PathBuf>,

    /// Keep the container's own chain; download nothing
    #[arg(long)]
    pub no_fetch: bool,

    /// Directory for generated bundles
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Bundle file to read
    pub bundle: PathBuf,
}
