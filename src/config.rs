// src/config.rs
// =============================================================================
// Run configuration for one mirror crawl.
//
// The CLI layer builds a MirrorConfig from flags; tests build one directly.
// Validation happens here so the core never sees a seed it cannot scope
// (no host) or a limiter it cannot make progress with (zero capacity).
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::fetch::HtmlDetection;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const MAX_CONCURRENCY: usize = 256;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Problems detected before the crawl starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{seed}'")]
    InvalidSeed {
        seed: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in seed URL '{seed}' (expected http or https)")]
    UnsupportedScheme { seed: String, scheme: String },

    #[error("seed URL '{seed}' has no host")]
    MissingHost { seed: String },

    #[error("concurrency must be between 1 and {max}, got {value}")]
    InvalidConcurrency { value: usize, max: usize },

    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Everything the crawl core needs to run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Absolute http(s) URL the crawl starts from.
    pub seed: Url,
    /// Mirror root; every stored file lands under it.
    pub output_root: PathBuf,
    /// Maximum recursion depth, 0 = unlimited.
    pub max_depth: usize,
    /// Admission capacity for recursive crawl tasks.
    pub concurrency: usize,
    /// Per-request transport timeout; `None` waits forever.
    pub request_timeout: Option<Duration>,
    pub html_detection: HtmlDetection,
}

impl MirrorConfig {
    /// Parses the seed and fills every other field with its default.
    pub fn new(seed: &str, output_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            seed: parse_seed(seed)?,
            output_root: output_root.into(),
            max_depth: 0,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            html_detection: HtmlDetection::default(),
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ConfigError> {
        validate_concurrency(concurrency)?;
        self.concurrency = concurrency;
        Ok(self)
    }

    /// `0` seconds disables the timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_html_detection(mut self, detection: HtmlDetection) -> Self {
        self.html_detection = detection;
        self
    }

    /// Re-checks fields that may have been set directly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_concurrency(self.concurrency)?;
        check_seed(self.seed.as_str(), &self.seed)
    }
}

/// Parses a seed URL: absolute, http or https, with a host.
pub fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let seed = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidSeed {
        seed: raw.to_string(),
        source,
    })?;
    check_seed(raw, &seed)?;
    Ok(seed)
}

fn check_seed(raw: &str, seed: &Url) -> Result<(), ConfigError> {
    if !matches!(seed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            seed: raw.to_string(),
            scheme: seed.scheme().to_string(),
        });
    }
    if seed.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingHost {
            seed: raw.to_string(),
        });
    }
    Ok(())
}

fn validate_concurrency(value: usize) -> Result<(), ConfigError> {
    if (1..=MAX_CONCURRENCY).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidConcurrency {
            value,
            max: MAX_CONCURRENCY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::new("https://example.com/start", "out").unwrap();
        assert_eq!(config.seed.as_str(), "https://example.com/start");
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(config.html_detection, HtmlDetection::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relative_seed_rejected() {
        let err = parse_seed("example.com/page").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeed { .. }));
    }

    #[test]
    fn test_invalid_seed_message_does_not_repeat_cause() {
        let err = parse_seed("not a url").unwrap_err();
        assert_eq!(err.to_string(), "invalid seed URL 'not a url'");

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches("relative URL without a base").count(), 1);
    }

    #[test]
    fn test_non_http_seed_rejected() {
        assert!(matches!(
            parse_seed("ftp://example.com/").unwrap_err(),
            ConfigError::UnsupportedScheme { .. }
        ));
        assert!(matches!(
            parse_seed("mailto:me@example.com").unwrap_err(),
            ConfigError::UnsupportedScheme { .. }
        ));
    }

    #[test]
    fn test_concurrency_bounds() {
        let config = MirrorConfig::new("http://site/", "out").unwrap();
        assert!(matches!(
            config.clone().with_concurrency(0).unwrap_err(),
            ConfigError::InvalidConcurrency { value: 0, .. }
        ));
        assert!(config.clone().with_concurrency(MAX_CONCURRENCY + 1).is_err());
        assert_eq!(config.with_concurrency(2).unwrap().concurrency, 2);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = MirrorConfig::new("http://site/", "out")
            .unwrap()
            .with_timeout_secs(0);
        assert_eq!(config.request_timeout, None);

        let config = config.with_timeout_secs(5);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_validate_catches_direct_field_edits() {
        let mut config = MirrorConfig::new("http://site/", "out").unwrap();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }
}
