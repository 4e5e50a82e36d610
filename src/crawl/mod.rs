// src/crawl/mod.rs
// =============================================================================
// This module handles the recursive crawl.
//
// Features:
// - Recursive, concurrent crawling starting from a seed URL
// - At most one fetch per URL (atomic claim in the visited set)
// - At most N recursive tasks in flight (admission limiter)
// - Optional depth limit (0 = unlimited)
// - Deterministic completion: `Mirror::run` returns when nothing is left
//
// Submodules:
// - visited: the claim registry
// - limiter: the admission token gate
// - scheduler: the crawl itself
// =============================================================================

mod limiter;
mod scheduler;
mod visited;

pub use limiter::{AdmissionLimiter, AdmissionToken};
pub use scheduler::{CrawlSummary, CrawlTarget, Mirror, MirrorBuilder};
pub use visited::{ClaimRegistry, VisitedSet};
