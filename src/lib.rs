// src/lib.rs
// =============================================================================
// site-mirror: recursive, bounded-concurrency website mirroring.
//
// Module map:
// - config: validated run configuration
// - crawl: scheduler, visited set, admission limiter
// - fetch: HTTP transport + fetch-and-store
// - extract: same-host link extraction from HTML
// - mirror: URL -> path mapping and the storage capability
// - error: the per-target error taxonomy
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod mirror;

pub use config::{ConfigError, MirrorConfig};
pub use crawl::{CrawlSummary, Mirror};
pub use error::{MirrorError, Result};
