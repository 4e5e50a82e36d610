// src/fetch/http.rs
// =============================================================================
// The fetch capability: one HTTP GET per call, returning the status, the
// declared content type and the full body.
//
// Key points:
// - One shared reqwest Client (connection pooling across all crawl tasks)
// - Optional per-request timeout: without it a hung server holds its crawl
//   task, and that task's admission token, forever
// - Redirects are followed with reqwest's default policy
// - Any status is returned as-is; deciding what "success" means is the
//   persister's job, not the transport's
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::error::{MirrorError, Result};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// What came back from one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub status: u16,
    /// Raw `Content-Type` header value, if the server sent a readable one.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResource {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can fetch a URL. Tests swap in fakes that count calls.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs exactly one request for `url`.
    ///
    /// Only transport failures are errors; a 404 is a successful fetch of a
    /// 404 response.
    async fn fetch(&self, url: &Url) -> Result<FetchedResource>;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the shared client. `timeout = None` disables the request timeout.
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        let transport = |source| MirrorError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // The body read can fail mid-stream too; that is still a transport error
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(FetchedResource {
            status,
            content_type,
            body,
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one Client for the whole crawl?
//    - A reqwest Client owns a connection pool
//    - Cloning or sharing it reuses keep-alive connections to the same host
//
// 2. What is #[async_trait]?
//    - It lets traits declare async fns that can be used as `dyn Fetch`
//    - The macro boxes the returned future behind the scenes
// -----------------------------------------------------------------------------
