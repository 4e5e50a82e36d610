// src/extract/mod.rs
// =============================================================================
// Link extraction from mirrored HTML pages.
//
// This file (mod.rs) is the module root: it only re-exports the public API
// of the html submodule.
// =============================================================================

mod html;

pub use html::{extract_links, extract_links_from_html, LinkHarvest};
