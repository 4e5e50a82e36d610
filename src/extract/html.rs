// src/extract/html.rs
// =============================================================================
// This module pulls same-host references out of a stored HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Never fails: broken markup still yields a (best effort) tree
//
// Which references count:
// - Elements: <a>, <img>, <link>, <script>
// - One attribute per element, first present of: data-src, src, href
//   (so <img data-src="a" src="b"> only yields "a")
// - Resolved against the page URL, kept only if the host (and port) matches
//   the page's host. That host check is what keeps the crawl on one site.
// =============================================================================

use std::path::Path;
use std::sync::OnceLock;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{MirrorError, Result};
use crate::mirror::Storage;

/// Elements that may reference other resources.
const REFERENCE_ELEMENTS: &str = "a, img, link, script";

/// Attribute precedence: lazy-load, then source, then hyperlink.
const REFERENCE_ATTRIBUTES: [&str; 3] = ["data-src", "src", "href"];

/// Links found in one page, plus what was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkHarvest {
    /// Same-host absolute URLs, in document order.
    pub links: Vec<Url>,
    /// References that resolved to another host (or no host at all).
    pub excluded: usize,
    /// References that could not be resolved.
    pub malformed: usize,
}

fn reference_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // The selector is a constant and known to be valid
    SELECTOR.get_or_init(|| Selector::parse(REFERENCE_ELEMENTS).expect("static selector parses"))
}

/// Reads the stored document back from `storage` and extracts its links.
pub async fn extract_links(
    storage: &dyn Storage,
    stored_path: &Path,
    source_url: &Url,
) -> Result<LinkHarvest> {
    let bytes = storage.read_file(stored_path).await?;
    let html = String::from_utf8_lossy(&bytes);
    Ok(extract_links_from_html(&html, source_url))
}

/// Extracts same-host references from an HTML string.
///
/// Synchronous on purpose: `scraper::Html` is not `Send`, so it must never
/// live across an `.await`.
pub fn extract_links_from_html(html: &str, source_url: &Url) -> LinkHarvest {
    let document = Html::parse_document(html);
    let mut harvest = LinkHarvest::default();

    for element in document.select(reference_selector()) {
        let element = element.value();

        // First attribute name present wins, even if its value turns out useless
        let Some(reference) = REFERENCE_ATTRIBUTES
            .iter()
            .find_map(|name| element.attr(name))
        else {
            continue;
        };

        if reference.trim().is_empty() {
            continue;
        }

        let resolved = match source_url.join(reference) {
            Ok(url) => url,
            Err(source) => {
                let err = MirrorError::MalformedReference {
                    reference: reference.to_string(),
                    source,
                };
                debug!(
                    page = %source_url,
                    error = &err as &dyn std::error::Error,
                    "skipping reference"
                );
                harvest.malformed += 1;
                continue;
            }
        };

        if same_host(&resolved, source_url) {
            harvest.links.push(resolved);
        } else {
            harvest.excluded += 1;
        }
    }

    harvest
}

// Host and explicit port must both match. URLs without a host
// (mailto:, javascript:, data:) never match.
fn same_host(candidate: &Url, source: &Url) -> bool {
    candidate.host_str().is_some()
        && candidate.host_str() == source.host_str()
        && candidate.port() == source.port()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is OnceLock?
//    - A cell that is written exactly once, the first time it is needed
//    - The selector is parsed on first use and shared by every later call
//
// 2. Why String::from_utf8_lossy?
//    - Stored pages are raw bytes and may not be valid UTF-8
//    - Invalid sequences become U+FFFD instead of failing the whole page
//
// 3. What does Url::join do?
//    - Resolves a reference relative to the page URL, like a browser does
//    - "../img.png" on http://site/a/b gives http://site/img.png
//    - Absolute references ("https://other/x") replace the base entirely
// -----------------------------------------------------------------------------
