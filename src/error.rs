// src/error.rs
// =============================================================================
// Error types for the mirror core.
//
// Every variant here is handled at the crawl target that produced it: the
// scheduler logs it and simply never schedules that target's subtree. Nothing
// in this enum aborts the crawl as a whole.
//
// Cross-host links are NOT an error. The link extractor counts them as
// excluded and moves on.
//
// Messages never repeat their #[source]: main prints the chain with {:#} and
// log sites record the error as a `dyn Error` field, so each cause appears
// exactly once.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Failure of a single crawl target.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("transport error fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx status.
    #[error("HTTP {status} fetching {url}")]
    NonSuccessStatus { url: String, status: u16 },

    /// Creating a directory or writing/reading a mirrored file failed.
    #[error("storage error at {}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reference in a page could not be resolved to a URL.
    /// Always recovered inside the link extractor.
    #[error("malformed reference '{reference}'")]
    MalformedReference {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// The admission limiter was closed while a task waited on it.
    #[error("admission limiter closed")]
    AdmissionClosed,
}

impl MirrorError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorError::Transport { .. } => "transport",
            MirrorError::NonSuccessStatus { .. } => "status",
            MirrorError::Storage { .. } => "storage",
            MirrorError::MalformedReference { .. } => "malformed_reference",
            MirrorError::AdmissionClosed => "admission_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = MirrorError::NonSuccessStatus {
            url: "http://site/missing".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 fetching http://site/missing");
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_storage_error_names_path() {
        let err = MirrorError::storage(
            "/tmp/mirror/index.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/mirror/index.html"));
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn test_chain_prints_each_cause_once() {
        let err = MirrorError::storage(
            "/tmp/mirror/index.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "storage error at /tmp/mirror/index.html");

        // Same rendering main uses for fatal errors
        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches("denied").count(), 1);
        assert_eq!(chain, "storage error at /tmp/mirror/index.html: denied");
    }

    #[test]
    fn test_malformed_reference_message_omits_parse_error() {
        let source = url::Url::parse("http://[::1").unwrap_err();
        let detail = source.to_string();
        let err = MirrorError::MalformedReference {
            reference: "http://[::1".to_string(),
            source,
        };
        assert_eq!(err.to_string(), "malformed reference 'http://[::1'");

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches(detail.as_str()).count(), 1);
    }
}
