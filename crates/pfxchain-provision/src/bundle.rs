//! PEM bundle holding a private key followed by its certificate chain.

use pfxchain_core::{encode_pem, Certificate, ChainError, Result, PEM_CERTIFICATE};
use tracing::debug;

/// Encoding of the private key block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// `PRIVATE KEY` (PKCS#8)
    Pkcs8,
    /// `RSA PRIVATE KEY` (PKCS#1)
    Rsa,
    /// `EC PRIVATE KEY` (SEC1)
    Ec,
}

impl KeyFormat {
    /// PEM tag for this format
    #[must_use]
    pub const fn pem_tag(self) -> &'static str {
        match self {
            Self::Pkcs8 => "PRIVATE KEY",
            Self::Rsa => "RSA PRIVATE KEY",
            Self::Ec => "EC PRIVATE KEY",
        }
    }

    fn from_pem_tag(tag: &str) -> Option<Self> {
        match tag {
            "PRIVATE KEY" => Some(Self::Pkcs8),
            "RSA PRIVATE KEY" => Some(Self::Rsa),
            "EC PRIVATE KEY" => Some(Self::Ec),
            _ => None,
        }
    }
}

/// Key plus chain, as handed to a TLS layer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bundle {
    key_format: KeyFormat,
    private_key: Vec<u8>,
    certificates: Vec<Vec<u8>>,
}

impl Bundle {
    /// Assemble a bundle from a PKCS#8 key and a chain, leaf first.
    #[must_use]
    pub fn new(private_key: Vec<u8>, chain: &[Certificate]) -> Self {
        Self {
            key_format: KeyFormat::Pkcs8,
            private_key,
            certificates: chain.iter().map(|cert| cert.der().to_vec()).collect(),
        }
    }

    /// Format of the private key
    #[must_use]
    pub const fn key_format(&self) -> KeyFormat {
        self.key_format
    }

    /// DER private key
    #[must_use]
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// DER certificates in chain order
    #[must_use]
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    /// Parse the chain for inspection
    pub fn parse_certificates(&self) -> Result<Vec<Certificate>> {
        self.certificates
            .iter()
            .map(|der| Certificate::from_der(der))
            .collect()
    }

    /// Key block first, then one `CERTIFICATE` block per chain element.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = encode_pem(self.key_format.pem_tag(), self.private_key.clone());
        for der in &self.certificates {
            out.push_str(&encode_pem(PEM_CERTIFICATE, der.clone()));
        }
        out.into_bytes()
    }

    /// Read a bundle back. Blocks of unknown type are skipped; the first key
    /// block wins.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let blocks = pem::parse_many(data).map_err(|e| ChainError::Pem(e.to_string()))?;

        let mut key: Option<(KeyFormat, Vec<u8>)> = None;
        let mut certificates = Vec::new();

        for block in blocks {
            if block.tag() == PEM_CERTIFICATE {
                certificates.push(block.into_contents());
            } else if let Some(format) = KeyFormat::from_pem_tag(block.tag()) {
                if key.is_none() {
                    key = Some((format, block.into_contents()));
                }
            } else {
                debug!(tag = block.tag(), "skipping PEM block in bundle");
            }
        }

        let (key_format, private_key) =
            key.ok_or_else(|| ChainError::Bundle("no private key block".into()))?;
        if certificates.is_empty() {
            return Err(ChainError::Bundle("no certificate block".into()));
        }

        Ok(Self {
            key_format,
            private_key,
            certificates,
        })
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("key_format", &self.key_format)
            .field("private_key", &"<redacted>")
            .field("certificates", &self.certificates.len())
            .finish()
    }
}
