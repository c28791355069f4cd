//! `pfxchain bundle` - Build the cached bundle for a PFX file.

use anyhow::{Context as _, Result};
use colored::Colorize;
use pfxchain::provision::{parse_directive, BlobStore, FileStorage, PfxConfig, PfxProvider};
use std::io::Write;

use super::Context;
use crate::cli::args::BundleArgs;
use crate::config::Config;
use crate::output::{print_chain, CertSummary, OutputFormat};

pub async fn execute(ctx: Context, args: BundleArgs) -> Result<()> {
    let pfx = pfx_config(&ctx, args)?;
    let cache_dir = match &pfx.cache_dir {
        Some(dir) => dir.clone(),
        None => Config::cache_dir()?,
    };

    let storage = FileStorage::new(cache_dir);
    let provider = PfxProvider::provision(pfx, storage.clone(), ctx.fetcher()?)
        .await?
        .with_options(ctx.resolve_options());
    let bundle = provider.get_certificate().await?;
    // Absent when resolution was cut short and the bundle was not cached
    let location = storage
        .exists(provider.cache_key())
        .await?
        .then(|| storage.path_for(provider.cache_key()));

    match ctx.output_format {
        OutputFormat::Pem => {
            std::io::stdout().write_all(&bundle.encode())?;
        }
        OutputFormat::Json => {
            let chain = bundle
                .parse_certificates()?
                .iter()
                .map(|cert| CertSummary::new(cert, None))
                .collect::<Vec<_>>();
            let output = serde_json::json!({
                "cache_key": provider.cache_key(),
                "location": location.as_ref().map(|path| path.display().to_string()),
                "key_format": bundle.key_format().pem_tag(),
                "certificates": chain,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            match &location {
                Some(path) => println!("{} {}", "Bundle:".bold(), path.display()),
                None => println!("{} {}", "Bundle:".bold(), "not cached (chain incomplete)".yellow()),
            }
            println!("{} {}", "Key:".bold(), bundle.key_format().pem_tag());
            println!();
            let chain = bundle
                .parse_certificates()?
                .iter()
                .map(|cert| CertSummary::new(cert, None))
                .collect::<Vec<_>>();
            print_chain(&chain);
        }
    }

    Ok(())
}

/// Directive or config file first, then command-line overrides.
fn pfx_config(ctx: &Context, args: BundleArgs) -> Result<PfxConfig> {
    let mut pfx = match &args.directive {
        Some(file) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            parse_directive(&text).with_context(|| format!("Invalid directive in {}", file.display()))?
        }
        None => ctx.config.pfx.clone().unwrap_or_default(),
    };

    if let Some(path) = args.pfx {
        pfx.path = path;
    }
    if let Some(password) = args.password {
        pfx.password = password;
    }
    if args.no_fetch {
        pfx.fetch_full_chain = Some(false);
    }
    if let Some(dir) = args.cache_dir {
        pfx.cache_dir = Some(dir);
    }

    if pfx.path.as_os_str().is_empty() {
        anyhow::bail!(
            "No PFX file given.\n\n\
             Set it with one of:\n  \
             1. --pfx <PATH>\n  \
             2. --directive <FILE>\n  \
             3. a [pfx] section in the config file"
        );
    }

    Ok(pfx)
}
