//! `pfxchain inspect` - Summarise a PEM bundle.

use anyhow::{Context as _, Result};
use colored::Colorize;
use pfxchain::provision::Bundle;

use super::Context;
use crate::cli::args::InspectArgs;
use crate::output::{print_chain, CertSummary, OutputFormat};

pub fn execute(ctx: &Context, args: &InspectArgs) -> Result<()> {
    let data = std::fs::read(&args.bundle)
        .with_context(|| format!("Failed to read {}", args.bundle.display()))?;
    let bundle = Bundle::decode(&data)
        .with_context(|| format!("{} is not a key + chain bundle", args.bundle.display()))?;
    let certificates = bundle.parse_certificates()?;

    match ctx.output_format {
        // The key is never echoed back.
        OutputFormat::Pem => {
            for cert in &certificates {
                print!("{}", cert.to_pem());
            }
        }
        OutputFormat::Json => {
            let chain: Vec<CertSummary> = certificates
                .iter()
                .map(|cert| CertSummary::new(cert, None))
                .collect();
            let output = serde_json::json!({
                "key_format": bundle.key_format().pem_tag(),
                "key_bytes": bundle.private_key().len(),
                "certificates": chain,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} bytes)",
                "Key:".bold(),
                bundle.key_format().pem_tag(),
                bundle.private_key().len()
            );
            println!("{} {} certificate(s)", "Chain:".bold(), certificates.len());
            println!();
            let chain: Vec<CertSummary> = certificates
                .iter()
                .map(|cert| CertSummary::new(cert, None))
                .collect();
            print_chain(&chain);

            if let Some(last) = certificates.last() {
                if !last.is_self_issued() && !last.issuing_certificate_urls().is_empty() {
                    println!();
                    println!(
                        "{} chain ends below a root; `pfxchain bundle` would fetch its issuer",
                        "Note:".yellow().bold()
                    );
                }
            }
        }
    }

    Ok(())
}
