//! pfxchain - complete certificate chains and build PEM bundles from PFX files.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pfxchain_cli::run().await
}
