use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pfxchain operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while loading, fetching or assembling certificates
#[derive(Error, Debug)]
pub enum ChainError {
    /// Bytes could not be parsed as an X.509 certificate
    #[error("certificate parse failed: {0}")]
    CertParse(String),

    /// PEM armour was malformed
    #[error("PEM decode failed: {0}")]
    Pem(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("unexpected HTTP status {code} from {url}")]
    Status {
        /// HTTP status code
        code: u16,
        /// URL that was requested
        url: String,
    },

    /// Issuer URL is malformed or uses an unsupported scheme
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body exceeded the configured limit
    #[error("response from {url} exceeds {limit} bytes")]
    BodyTooLarge {
        /// URL that was requested
        url: String,
        /// Configured maximum body size
        limit: usize,
    },

    /// Request timed out or the resolution deadline passed
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// PKCS#12 container could not be decoded
    #[error("PKCS#12 error: {0}")]
    Pkcs12(String),

    /// Bundle is missing a required block
    #[error("invalid bundle: {0}")]
    Bundle(String),

    /// Filesystem access failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Cache entry does not exist
    #[error("cache entry not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or missing required fields
    #[error("configuration error: {0}")]
    Config(String),

    /// Worklist reached a state that should be impossible
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Build an [`ChainError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for per-URL failures the resolver skips over
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::CertParse(_)
                | Self::Pem(_)
                | Self::Http(_)
                | Self::Status { .. }
                | Self::InvalidUrl(_)
                | Self::BodyTooLarge { .. }
                | Self::Timeout(_)
        )
    }

    /// Returns the HTTP status code if this is a status error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
