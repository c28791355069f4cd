//! Output formatting for different formats.

use clap::ValueEnum;
use colored::Colorize;
use pfxchain::{Certificate, KeyId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// PEM blocks, ready to save
    Pem,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "pem" => Ok(Self::Pem),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json, pem",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Pem => write!(f, "pem"),
        }
    }
}

/// Where a chain element came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Input,
    Fetched,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Fetched => write!(f, "fetched"),
        }
    }
}

/// One chain element as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CertSummary {
    pub subject: String,
    pub issuer: String,
    pub subject_key_id: KeyId,
    pub authority_key_id: KeyId,
    pub issuer_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl CertSummary {
    pub fn new(cert: &Certificate, source: Option<Source>) -> Self {
        Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            subject_key_id: cert.subject_key_id().clone(),
            authority_key_id: cert.authority_key_id().clone(),
            issuer_urls: cert.issuing_certificate_urls().to_vec(),
            source,
        }
    }
}

/// Print a chain as an indented, colored listing.
pub fn print_chain(chain: &[CertSummary]) {
    for (i, cert) in chain.iter().enumerate() {
        let source = match cert.source {
            Some(Source::Input) => format!(" [{}]", "input".dimmed()),
            Some(Source::Fetched) => format!(" [{}]", "fetched".green()),
            None => String::new(),
        };
        println!("{}{source}", format!("{i}. {}", cert.subject).bold());
        println!("   Issuer: {}", cert.issuer);
        println!("   SKI:    {}", cert.subject_key_id.to_string().cyan());
        println!("   AKI:    {}", cert.authority_key_id.to_string().cyan());
        for url in &cert.issuer_urls {
            println!("   CA:     {url}");
        }
    }
}
