//! Key identifiers linking a certificate to its issuer.

use serde::{Serialize, Serializer};
use std::fmt;

/// Subject or authority key identifier.
///
/// Identity is exact byte equality, except that an empty identifier never
/// matches anything, another empty identifier included. Certificates that
/// omit the extension carry an empty id and cannot be deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyId(Vec<u8>);

impl KeyId {
    /// An identifier for a certificate without the extension
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns true if the certificate carried no identifier
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw identifier bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if both identifiers are present and byte-identical
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        !self.is_empty() && self.0 == other.0
    }
}

impl From<&[u8]> for KeyId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for KeyId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for KeyId {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Colon-separated uppercase hex, the way certificate dumps show it.
impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let hex = hex::encode_upper(&self.0);
        let mut first = true;
        for pair in hex.as_bytes().chunks(2) {
            if !first {
                f.write_str(":")?;
            }
            first = false;
            f.write_str(std::str::from_utf8(pair).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

/// Same text as `Display`; an empty identifier serializes as none.
impl Serialize for KeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.collect_str(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_never_matches() {
        let a = KeyId::empty();
        let b = KeyId::empty();
        assert!(!a.matches(&b));
        assert!(!a.matches(&a));
        assert!(!KeyId::from("L").matches(&a));
        assert!(!a.matches(&KeyId::from("L")));
    }

    #[test]
    fn identical_bytes_match() {
        assert!(KeyId::from("I").matches(&KeyId::from(vec![0x49])));
        assert!(!KeyId::from("I").matches(&KeyId::from("R")));
        assert!(!KeyId::from("IR").matches(&KeyId::from("I")));
    }

    #[test]
    fn display_is_colon_hex() {
        assert_eq!(KeyId::from(vec![0x4c]).to_string(), "4C");
        assert_eq!(KeyId::from(vec![0xab, 0x01, 0xff]).to_string(), "AB:01:FF");
        assert_eq!(KeyId::empty().to_string(), "-");
    }

    #[test]
    fn serializes_like_display() {
        let json = serde_json::to_value(KeyId::from(vec![0xab, 0x01])).unwrap();
        assert_eq!(json, serde_json::json!("AB:01"));
        assert!(serde_json::to_value(KeyId::empty()).unwrap().is_null());
    }
}
