//! Parsed X.509 certificates and the PEM/DER sniffing used on fetched bodies.

use pem::{EncodeConfig, LineEnding, Pem};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::X509Certificate;

use crate::error::{ChainError, Result};
use crate::key_id::KeyId;

/// PEM tag for certificate blocks.
pub const PEM_CERTIFICATE: &str = "CERTIFICATE";

/// Access method OID for `caIssuers` in the Authority Information Access extension.
const OID_CA_ISSUERS: &str = "1.3.6.1.5.5.7.48.2";

/// A certificate reduced to the fields chain assembly reads, plus its DER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    subject_key_id: KeyId,
    authority_key_id: KeyId,
    issuing_certificate_urls: Vec<String>,
}

impl Certificate {
    /// Parse a single DER-encoded certificate. Trailing bytes are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (rest, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| ChainError::CertParse(e.to_string()))?;
        if !rest.is_empty() {
            return Err(ChainError::CertParse(format!(
                "{} trailing bytes after certificate",
                rest.len()
            )));
        }
        Ok(Self::from_parsed(&cert, der.to_vec()))
    }

    /// Parse the first `CERTIFICATE` block of a PEM document.
    pub fn from_pem(data: &[u8]) -> Result<Self> {
        let block = pem::parse(data).map_err(|e| ChainError::Pem(e.to_string()))?;
        if block.tag() != PEM_CERTIFICATE {
            return Err(ChainError::Pem(format!(
                "expected {PEM_CERTIFICATE} block, found {}",
                block.tag()
            )));
        }
        Self::from_der(block.contents())
    }

    /// Parse every `CERTIFICATE` block of a PEM bundle, in order.
    ///
    /// Blocks of other types (keys, parameters) are skipped.
    pub fn parse_many_pem(data: &[u8]) -> Result<Vec<Self>> {
        let blocks = pem::parse_many(data).map_err(|e| ChainError::Pem(e.to_string()))?;
        blocks
            .iter()
            .filter(|block| block.tag() == PEM_CERTIFICATE)
            .map(|block| Self::from_der(block.contents()))
            .collect()
    }

    /// Build a certificate value directly from its chain-relevant fields.
    ///
    /// The DER is carried as-is and never interpreted.
    #[must_use]
    pub fn from_parts(
        der: Vec<u8>,
        subject_key_id: KeyId,
        authority_key_id: KeyId,
        issuing_certificate_urls: Vec<String>,
    ) -> Self {
        Self {
            der,
            subject: String::new(),
            issuer: String::new(),
            subject_key_id,
            authority_key_id,
            issuing_certificate_urls,
        }
    }

    fn from_parsed(cert: &X509Certificate<'_>, der: Vec<u8>) -> Self {
        let mut subject_key_id = KeyId::empty();
        let mut authority_key_id = KeyId::empty();
        let mut issuing_certificate_urls = Vec::new();

        for extension in cert.extensions() {
            match extension.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(ski) => {
                    subject_key_id = KeyId::from(ski.0);
                }
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    if let Some(key_id) = &aki.key_identifier {
                        authority_key_id = KeyId::from(key_id.0);
                    }
                }
                ParsedExtension::AuthorityInfoAccess(aia) => {
                    for desc in &aia.accessdescs {
                        if desc.access_method.to_id_string() != OID_CA_ISSUERS {
                            continue;
                        }
                        if let GeneralName::URI(uri) = &desc.access_location {
                            issuing_certificate_urls.push((*uri).to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            der,
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            subject_key_id,
            authority_key_id,
            issuing_certificate_urls,
        }
    }

    /// DER encoding, used only for serialisation
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Identifier of this certificate's own key (may be empty)
    #[must_use]
    pub const fn subject_key_id(&self) -> &KeyId {
        &self.subject_key_id
    }

    /// Identifier of the issuing key (may be empty)
    #[must_use]
    pub const fn authority_key_id(&self) -> &KeyId {
        &self.authority_key_id
    }

    /// `caIssuers` URLs from Authority Information Access, in certificate order
    #[must_use]
    pub fn issuing_certificate_urls(&self) -> &[String] {
        &self.issuing_certificate_urls
    }

    /// Returns true if the authority key id names this certificate's own key
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.authority_key_id.matches(&self.subject_key_id)
    }

    /// Encode as a single PEM `CERTIFICATE` block with LF line endings.
    #[must_use]
    pub fn to_pem(&self) -> String {
        encode_pem(PEM_CERTIFICATE, self.der.clone())
    }
}

/// Encode one PEM block with LF line endings.
#[must_use]
pub fn encode_pem(tag: &str, contents: Vec<u8>) -> String {
    let block = Pem::new(tag, contents);
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Interpret a fetched body as a certificate.
///
/// Only the first PEM block is consulted. If it is a `CERTIFICATE` block its
/// contents must parse; otherwise the whole body is tried as DER.
pub fn parse_fetched(body: &[u8]) -> Result<Certificate> {
    if let Ok(block) = pem::parse(body) {
        if block.tag() == PEM_CERTIFICATE {
            return Certificate::from_der(block.contents());
        }
    }
    Certificate::from_der(body)
}
