//! Cache keys tied to the source file's identity and modification time.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use std::time::SystemTime;

/// Suffix for bundles whose chain was completed over the network
pub const FULL_CHAIN_SUFFIX: &str = "-fullchain+pkey.pem";

/// Suffix for bundles holding only the container's own chain
pub const CHAIN_SUFFIX: &str = "-chain+pkey.pem";

/// `<path>.<mtime RFC 3339>` plus a suffix naming what the bundle contains.
///
/// Replacing the file changes its mtime and therefore the key, so stale
/// bundles are never served.
#[must_use]
pub fn cache_key(path: &Path, modified: SystemTime, full_chain: bool) -> String {
    let stamp = DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true);
    let suffix = if full_chain {
        FULL_CHAIN_SUFFIX
    } else {
        CHAIN_SUFFIX
    };
    format!("{}.{stamp}{suffix}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn may_first() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_714_557_600)
    }

    #[test]
    fn full_chain_key() {
        let key = cache_key(Path::new("/etc/ssl/site.pfx"), may_first(), true);
        assert_eq!(key, "/etc/ssl/site.pfx.2024-05-01T10:00:00Z-fullchain+pkey.pem");
    }

    #[test]
    fn plain_chain_key() {
        let key = cache_key(Path::new("site.pfx"), may_first(), false);
        assert_eq!(key, "site.pfx.2024-05-01T10:00:00Z-chain+pkey.pem");
    }

    #[test]
    fn sub_second_changes_are_truncated() {
        let a = cache_key(Path::new("a.pfx"), may_first(), true);
        let b = cache_key(Path::new("a.pfx"), may_first() + Duration::from_millis(400), true);
        assert_eq!(a, b);
        let c = cache_key(Path::new("a.pfx"), may_first() + Duration::from_secs(1), true);
        assert_ne!(a, c);
    }
}
