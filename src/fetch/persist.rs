// src/fetch/persist.rs
// =============================================================================
// Fetch one URL and persist it into the mirror.
//
// Steps:
// 1. Fetch (exactly once, no retry)
// 2. Reject non-2xx responses
// 3. Map the URL to a local path, create parent directories
// 4. Write the whole body
// 5. Classify the content as HTML or not, from the declared Content-Type
// =============================================================================

use std::path::{Path, PathBuf};

use url::Url;

use super::http::Fetch;
use crate::error::{MirrorError, Result};
use crate::mirror::{map_url_to_path, Storage};

/// The exact Content-Type the strict detector accepts.
pub const STRICT_HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Whether a stored resource should be parsed for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Other,
}

/// How the Content-Type header is matched against HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlDetection {
    /// Exact string equality with `text/html; charset=utf-8`.
    /// Pages served as plain `text/html` or `charset=UTF-8` are not parsed.
    #[default]
    Strict,
    /// Media type `text/html` (case-insensitive), any parameters.
    MediaType,
}

impl HtmlDetection {
    pub fn classify(self, content_type: Option<&str>) -> ContentKind {
        let Some(content_type) = content_type else {
            return ContentKind::Other;
        };

        let is_html = match self {
            HtmlDetection::Strict => content_type == STRICT_HTML_CONTENT_TYPE,
            // "text/html; charset=UTF-8" -> "text/html"
            HtmlDetection::MediaType => content_type
                .split(';')
                .next()
                .map(|essence| essence.trim().eq_ignore_ascii_case("text/html"))
                .unwrap_or(false),
        };

        if is_html {
            ContentKind::Html
        } else {
            ContentKind::Other
        }
    }
}

/// A resource that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    pub source_url: Url,
    pub local_path: PathBuf,
    pub content_kind: ContentKind,
}

impl MirrorEntry {
    pub fn is_html(&self) -> bool {
        self.content_kind == ContentKind::Html
    }
}

/// Fetches `url` once and writes the body under `root`.
///
/// Fails with `Transport`, `NonSuccessStatus` or `Storage`. On a failed write
/// a partial file may remain on disk.
pub async fn fetch_and_store(
    fetcher: &dyn Fetch,
    storage: &dyn Storage,
    root: &Path,
    url: &Url,
    detection: HtmlDetection,
) -> Result<MirrorEntry> {
    // Step 1: one request, transport errors propagate as-is
    let fetched = fetcher.fetch(url).await?;

    // Step 2: a 404 page is a response, not a mirror entry
    if !fetched.is_success() {
        return Err(MirrorError::NonSuccessStatus {
            url: url.to_string(),
            status: fetched.status,
        });
    }

    // Step 3: directories first; concurrent tasks may create the same parent
    let local_path = map_url_to_path(root, url);
    if let Some(parent) = local_path.parent() {
        storage.ensure_dir(parent).await?;
    }
    // Step 4: whole body in one write, replacing any earlier file
    storage.write_file(&local_path, &fetched.body).await?;

    // Step 5: classification only looks at the header, never the body
    Ok(MirrorEntry {
        source_url: url.clone(),
        local_path,
        content_kind: detection.classify(fetched.content_type.as_deref()),
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why take &dyn Fetch and &dyn Storage instead of concrete types?
//    - Tests pass fakes (a canned response, a read-only disk)
//    - No network or real filesystem is needed to test the error paths
//
// 2. What does `?` do after fetcher.fetch(url).await?
//    - If the result is Err, return it from this function right away
//    - If it is Ok, unwrap the value and keep going
//
// 3. Why is the Content-Type not sniffed from the body?
//    - Only pages the server declares as HTML get parsed for links
//    - Images or CSS that happen to contain "<a href" are left alone
//
// 4. What is as_deref()?
//    - Turns Option<String> into Option<&str> without cloning
// -----------------------------------------------------------------------------
