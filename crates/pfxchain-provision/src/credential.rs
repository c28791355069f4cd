//! PKCS#12 credential source.

use p12_keystore::{KeyStore, KeyStoreEntry};
use pfxchain_core::{Certificate, ChainError, Result};
use tracing::debug;

/// Private key, leaf and bundled intermediates decoded from a PFX file.
pub struct Credential {
    private_key: Vec<u8>,
    leaf: Certificate,
    intermediates: Vec<Certificate>,
}

impl Credential {
    /// Decode a PKCS#12 container.
    ///
    /// The first private key chain supplies the key and the leaf (its first
    /// certificate). Intermediates are the rest of that chain followed by any
    /// standalone certificate entries not already present.
    pub fn from_pkcs12(data: &[u8], password: &str) -> Result<Self> {
        let keystore =
            KeyStore::from_pkcs12(data, password).map_err(|e| ChainError::Pkcs12(e.to_string()))?;

        let (alias, key_chain) = keystore
            .private_key_chain()
            .ok_or_else(|| ChainError::Pkcs12("container holds no private key".into()))?;

        let mut chain = key_chain
            .chain()
            .iter()
            .map(|cert| Certificate::from_der(cert.as_der()))
            .collect::<Result<Vec<_>>>()?;
        if chain.is_empty() {
            return Err(ChainError::Pkcs12(format!(
                "private key {alias} has no certificate"
            )));
        }
        let leaf = chain.remove(0);
        let mut intermediates = chain;

        for (_, entry) in keystore.entries() {
            if let KeyStoreEntry::Certificate(cert) = entry {
                let der = cert.as_der();
                if der == leaf.der() || intermediates.iter().any(|c| c.der() == der) {
                    continue;
                }
                intermediates.push(Certificate::from_der(der)?);
            }
        }

        debug!(
            alias,
            leaf = leaf.subject(),
            intermediates = intermediates.len(),
            "decoded PKCS#12 container"
        );

        Ok(Self {
            private_key: key_chain.key().to_vec(),
            leaf,
            intermediates,
        })
    }

    /// PKCS#8 DER private key
    #[must_use]
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// End-entity certificate
    #[must_use]
    pub const fn leaf(&self) -> &Certificate {
        &self.leaf
    }

    /// Certificates bundled alongside the leaf
    #[must_use]
    pub fn intermediates(&self) -> &[Certificate] {
        &self.intermediates
    }

    /// Leaf followed by the bundled intermediates, ready for resolution
    #[must_use]
    pub fn initial_chain(&self) -> Vec<Certificate> {
        std::iter::once(self.leaf.clone())
            .chain(self.intermediates.iter().cloned())
            .collect()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("private_key", &"<redacted>")
            .field("leaf", &self.leaf.subject())
            .field("intermediates", &self.intermediates.len())
            .finish()
    }
}
