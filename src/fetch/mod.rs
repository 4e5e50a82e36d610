// src/fetch/mod.rs
// =============================================================================
// Fetching resources and persisting them into the mirror.
//
// Submodules:
// - http: the transport capability (trait + reqwest implementation)
// - persist: fetch once, check status, write to disk, classify content
// =============================================================================

mod http;
mod persist;

pub use http::{Fetch, FetchedResource, HttpFetcher, USER_AGENT};
pub use persist::{
    fetch_and_store, ContentKind, HtmlDetection, MirrorEntry, STRICT_HTML_CONTENT_TYPE,
};
