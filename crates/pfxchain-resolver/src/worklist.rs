//! Pending issuer lookups.

use pfxchain_core::{Certificate, KeyId};
use std::collections::VecDeque;
use tracing::debug;

/// A certificate whose issuer has not been seen yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    subject_key_id: KeyId,
    authority_key_id: KeyId,
    issuing_certificate_urls: Vec<String>,
}

impl ResolutionEntry {
    /// Identifier of the certificate this entry tracks
    #[must_use]
    pub const fn subject_key_id(&self) -> &KeyId {
        &self.subject_key_id
    }

    /// Identifier of the missing issuer
    #[must_use]
    pub const fn authority_key_id(&self) -> &KeyId {
        &self.authority_key_id
    }

    /// Where the issuer may be downloaded from, in certificate order
    #[must_use]
    pub fn issuing_certificate_urls(&self) -> &[String] {
        &self.issuing_certificate_urls
    }
}

impl From<&Certificate> for ResolutionEntry {
    fn from(cert: &Certificate) -> Self {
        Self {
            subject_key_id: cert.subject_key_id().clone(),
            authority_key_id: cert.authority_key_id().clone(),
            issuing_certificate_urls: cert.issuing_certificate_urls().to_vec(),
        }
    }
}

/// FIFO of unresolved entries plus every subject key id seen so far.
///
/// Invariant: no queued entry has an authority key id matching a known
/// subject key id.
#[derive(Debug, Default)]
pub struct Worklist {
    entries: VecDeque<ResolutionEntry>,
    known: Vec<KeyId>,
}

impl Worklist {
    /// Create an empty worklist
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a certificate and drop every entry it satisfies.
    ///
    /// A certificate whose subject key id matches a queued entry is already
    /// tracked and adds nothing. Otherwise a new entry is queued at the back
    /// and the queue is re-filtered against all known subject key ids, so
    /// one insertion can satisfy several pending entries (including the new
    /// one, when it is self-issued or its issuer arrived earlier).
    ///
    /// Returns true if an entry was queued.
    pub fn track(&mut self, cert: &Certificate) -> bool {
        let ski = cert.subject_key_id();
        if self
            .entries
            .iter()
            .any(|entry| entry.subject_key_id.matches(ski))
        {
            debug!(ski = %ski, "certificate already tracked");
            return false;
        }

        if !ski.is_empty() && !self.known.contains(ski) {
            self.known.push(ski.clone());
        }
        self.entries.push_back(ResolutionEntry::from(cert));

        let before = self.entries.len();
        let known = &self.known;
        self.entries.retain(|entry| {
            !known
                .iter()
                .any(|id| entry.authority_key_id.matches(id))
        });
        debug!(
            ski = %ski,
            satisfied = before - self.entries.len(),
            pending = self.entries.len(),
            "worklist updated"
        );
        true
    }

    /// Remove and return the oldest unresolved entry
    pub fn pop_front(&mut self) -> Option<ResolutionEntry> {
        self.entries.pop_front()
    }

    /// Number of unresolved entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is left to resolve
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unresolved entries in processing order
    pub fn iter(&self) -> impl Iterator<Item = &ResolutionEntry> {
        self.entries.iter()
    }

    /// Returns true if a certificate with this subject key id has been seen
    #[must_use]
    pub fn knows(&self, id: &KeyId) -> bool {
        self.known.iter().any(|known| known.matches(id))
    }
}
