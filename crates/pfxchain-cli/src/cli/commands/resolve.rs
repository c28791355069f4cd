//! `pfxchain resolve` - Complete the chain for certificate files.

use anyhow::{Context as _, Result};
use colored::Colorize;
use pfxchain::{Certificate, ChainResolver};
use std::path::Path;
use tracing::debug;

use super::Context;
use crate::cli::args::ResolveArgs;
use crate::output::{print_chain, CertSummary, OutputFormat, Source};

pub async fn execute(ctx: Context, args: ResolveArgs) -> Result<()> {
    let mut initial = Vec::new();
    for file in &args.files {
        initial.extend(read_certificates(file)?);
    }

    let resolver = ChainResolver::with_options(ctx.fetcher()?, ctx.resolve_options());
    let resolved = resolver.resolve(initial).await?;

    let input_len = resolved.certificates().len() - resolved.fetched().len();
    let chain: Vec<CertSummary> = resolved
        .certificates()
        .iter()
        .enumerate()
        .map(|(i, cert)| {
            let source = if i < input_len {
                Source::Input
            } else {
                Source::Fetched
            };
            CertSummary::new(cert, Some(source))
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Pem => {
            for cert in resolved.certificates() {
                print!("{}", cert.to_pem());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "certificates": chain,
                "attempts": resolved.attempts(),
                "complete": resolved.is_complete(),
                "stopped": resolved.stopped().map(|reason| reason.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            print_chain(&chain);
            println!();
            let fetched = resolved.fetched().len();
            match resolved.stopped() {
                None => println!(
                    "{} {} certificate(s), {fetched} fetched in {} attempt(s)",
                    "Chain:".bold(),
                    chain.len(),
                    resolved.attempts()
                ),
                Some(reason) => println!(
                    "{} {} certificate(s), stopped early: {reason}",
                    "Chain:".yellow().bold(),
                    chain.len()
                ),
            }
        }
    }

    Ok(())
}

/// All certificates in a PEM file, or the single certificate of a DER file.
fn read_certificates(path: &Path) -> Result<Vec<Certificate>> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match Certificate::parse_many_pem(&data) {
        Ok(certs) if !certs.is_empty() => {
            debug!(file = %path.display(), count = certs.len(), "read PEM certificates");
            Ok(certs)
        }
        _ => {
            let cert = Certificate::from_der(&data)
                .with_context(|| format!("{} is neither PEM nor DER", path.display()))?;
            Ok(vec![cert])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn testdata(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../testdata")
            .join(name)
    }

    #[test]
    fn reads_pem_and_der_files() {
        let pem = read_certificates(&testdata("int.pem")).unwrap();
        let der = read_certificates(&testdata("int.der")).unwrap();
        assert_eq!(pem, der);
    }

    #[test]
    fn rejects_files_that_are_not_certificates() {
        assert!(read_certificates(&testdata("leaf.key")).is_err());
    }
}
