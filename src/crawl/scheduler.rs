// src/crawl/scheduler.rs
// =============================================================================
// This module drives the recursive mirror crawl.
//
// How it works:
// 1. The seed URL (depth 0) is claimed and fetched on the calling task
// 2. Fetched resources are written into the mirror
// 3. HTML pages are parsed for same-host links
// 4. Each link passes the depth gate, is claimed in the visited set, waits for
//    an admission token and is then spawned as its own task at depth + 1
// 5. Every task awaits its children, so `run` returns exactly when no work is
//    left anywhere in the crawl
//
// Token discipline:
// - A task holds its token while it fetches, stores and parses its page
// - The token is dropped BEFORE the task schedules children or waits on them
// - So no task ever blocks on the limiter (or on children) while holding
//   capacity, and the crawl cannot deadlock even with a capacity of 1
//
// Failures are terminal for the one target that hit them: they are logged,
// counted, and that target's links are never discovered. No retries.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::limiter::{AdmissionLimiter, AdmissionToken};
use super::visited::{ClaimRegistry, VisitedSet};
use crate::config::{ConfigError, MirrorConfig, DEFAULT_CONCURRENCY};
use crate::extract::extract_links;
use crate::fetch::{fetch_and_store, Fetch, HtmlDetection, HttpFetcher};
use crate::mirror::{LocalStorage, Storage};

/// One unit of discovery work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    /// Link hops from the seed.
    pub depth: usize,
}

impl CrawlTarget {
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

// Live counters, bumped from every crawl task
#[derive(Debug, Default)]
struct MirrorStats {
    claimed: AtomicUsize,
    stored: AtomicUsize,
    html_pages: AtomicUsize,
    skipped: AtomicUsize,
    depth_limited: AtomicUsize,
    failed: AtomicUsize,
    excluded: AtomicUsize,
    malformed: AtomicUsize,
}

impl MirrorStats {
    fn bump(counter: &AtomicUsize, by: usize) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            claimed: self.claimed.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            html_pages: self.html_pages.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            depth_limited: self.depth_limited.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            excluded: self.excluded.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Counts of what happened during one run.
///
/// Informational only: it says nothing about which files are in the mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Targets that won their claim and were fetched.
    pub claimed: usize,
    /// Resources written to disk.
    pub stored: usize,
    /// Stored resources classified as HTML.
    pub html_pages: usize,
    /// Targets dropped because their URL was already claimed.
    pub skipped: usize,
    /// Targets dropped by the depth gate.
    pub depth_limited: usize,
    /// Targets whose fetch, write or parse failed.
    pub failed: usize,
    /// References to other hosts.
    pub excluded: usize,
    /// References that could not be resolved.
    pub malformed: usize,
}

/// A configured, not yet started mirror crawl.
pub struct Mirror {
    shared: Arc<Shared>,
}

struct Shared {
    fetcher: Arc<dyn Fetch>,
    storage: Arc<dyn Storage>,
    visited: Arc<dyn ClaimRegistry>,
    limiter: AdmissionLimiter,
    output_root: PathBuf,
    max_depth: usize,
    html_detection: HtmlDetection,
    stats: MirrorStats,
}

/// Assembles a [`Mirror`] from injected collaborators.
pub struct MirrorBuilder {
    fetcher: Arc<dyn Fetch>,
    output_root: PathBuf,
    storage: Arc<dyn Storage>,
    visited: Arc<dyn ClaimRegistry>,
    limiter: AdmissionLimiter,
    max_depth: usize,
    html_detection: HtmlDetection,
}

impl MirrorBuilder {
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn visited(mut self, visited: Arc<dyn ClaimRegistry>) -> Self {
        self.visited = visited;
        self
    }

    pub fn limiter(mut self, limiter: AdmissionLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// 0 = unlimited.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn html_detection(mut self, detection: HtmlDetection) -> Self {
        self.html_detection = detection;
        self
    }

    pub fn build(self) -> Mirror {
        Mirror {
            shared: Arc::new(Shared {
                fetcher: self.fetcher,
                storage: self.storage,
                visited: self.visited,
                limiter: self.limiter,
                output_root: self.output_root,
                max_depth: self.max_depth,
                html_detection: self.html_detection,
                stats: MirrorStats::default(),
            }),
        }
    }
}

impl Mirror {
    /// Builds a mirror with the real HTTP fetcher, local storage and a fresh
    /// visited set, as described by `config`.
    pub fn new(config: &MirrorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.request_timeout)?;

        Ok(Self::builder(Arc::new(fetcher), config.output_root.clone())
            .limiter(AdmissionLimiter::new(config.concurrency))
            .max_depth(config.max_depth)
            .html_detection(config.html_detection)
            .build())
    }

    /// Starts a builder with local storage, a fresh visited set and the
    /// default admission capacity.
    pub fn builder(fetcher: Arc<dyn Fetch>, output_root: impl Into<PathBuf>) -> MirrorBuilder {
        MirrorBuilder {
            fetcher,
            output_root: output_root.into(),
            storage: Arc::new(LocalStorage::new()),
            visited: Arc::new(VisitedSet::new()),
            limiter: AdmissionLimiter::new(DEFAULT_CONCURRENCY),
            max_depth: 0,
            html_detection: HtmlDetection::default(),
        }
    }

    /// Mirrors everything reachable from `seed` and returns once no crawl
    /// task is left. Individual failures never make this fail.
    pub async fn run(self, seed: Url) -> CrawlSummary {
        let shared = self.shared;
        let target = CrawlTarget::seed(seed);

        info!(
            seed = %target.url,
            root = %shared.output_root.display(),
            max_depth = shared.max_depth,
            concurrency = shared.limiter.capacity(),
            "starting mirror"
        );

        // The seed page downloads without a token; only its expansion is gated
        if shared.admit(&target) {
            Arc::clone(&shared).crawl(target, None).await;
        }

        let summary = shared.stats.summary();
        info!(
            stored = summary.stored,
            html_pages = summary.html_pages,
            skipped = summary.skipped,
            depth_limited = summary.depth_limited,
            failed = summary.failed,
            excluded = summary.excluded,
            "mirror finished"
        );
        summary
    }
}

impl Shared {
    fn depth_allows(&self, depth: usize) -> bool {
        self.max_depth == 0 || depth <= self.max_depth
    }

    // Depth gate, then claim. True means the caller now owns this URL.
    fn admit(&self, target: &CrawlTarget) -> bool {
        if !self.depth_allows(target.depth) {
            MirrorStats::bump(&self.stats.depth_limited, 1);
            debug!(url = %target.url, depth = target.depth, "beyond depth limit");
            return false;
        }

        if !self.visited.try_claim(&target.url) {
            MirrorStats::bump(&self.stats.skipped, 1);
            debug!(url = %target.url, depth = target.depth, "already claimed, skipping");
            return false;
        }

        MirrorStats::bump(&self.stats.claimed, 1);
        debug!(url = %target.url, depth = target.depth, "claimed");
        true
    }

    // Fetch + store + (maybe) extract. Returns the links to recurse into.
    async fn process(&self, target: &CrawlTarget) -> Vec<Url> {
        // Any error here ends this target; its links are never discovered
        let entry = match fetch_and_store(
            self.fetcher.as_ref(),
            self.storage.as_ref(),
            &self.output_root,
            &target.url,
            self.html_detection,
        )
        .await
        {
            Ok(entry) => entry,
            Err(e) => {
                MirrorStats::bump(&self.stats.failed, 1);
                warn!(
                    url = %target.url,
                    depth = target.depth,
                    kind = e.kind(),
                    error = &e as &dyn std::error::Error,
                    "fetch failed"
                );
                return Vec::new();
            }
        };

        MirrorStats::bump(&self.stats.stored, 1);
        info!(
            url = %target.url,
            path = %entry.local_path.display(),
            depth = target.depth,
            "stored"
        );

        if !entry.is_html() {
            return Vec::new();
        }
        MirrorStats::bump(&self.stats.html_pages, 1);

        // Children would all be cut by the depth gate, so don't bother parsing
        if !self.depth_allows(target.depth + 1) {
            return Vec::new();
        }

        match extract_links(self.storage.as_ref(), &entry.local_path, &target.url).await {
            Ok(harvest) => {
                MirrorStats::bump(&self.stats.excluded, harvest.excluded);
                MirrorStats::bump(&self.stats.malformed, harvest.malformed);
                debug!(
                    url = %target.url,
                    links = harvest.links.len(),
                    excluded = harvest.excluded,
                    malformed = harvest.malformed,
                    "extracted links"
                );
                harvest.links
            }
            Err(e) => {
                MirrorStats::bump(&self.stats.failed, 1);
                warn!(
                    url = %target.url,
                    kind = e.kind(),
                    error = &e as &dyn std::error::Error,
                    "link extraction failed"
                );
                Vec::new()
            }
        }
    }

    // Boxed because the future spawns copies of itself.
    fn crawl(
        self: Arc<Self>,
        target: CrawlTarget,
        token: Option<AdmissionToken>,
    ) -> BoxFuture<'static, ()> {
        async move {
            // Step 1: this target's own work, under its token
            let links = self.process(&target).await;

            // Step 2: give the capacity back before waiting on anything else
            drop(token);

            // Step 3: admit each link and spawn it under a fresh token
            let mut children = FuturesUnordered::new();
            for url in links {
                let child = target.child(url);
                // Duplicates and too-deep links never cost a token
                if !self.admit(&child) {
                    continue;
                }

                // Blocks while `capacity` tasks are busy; this task holds none
                let token = match self.limiter.acquire().await {
                    Ok(token) => token,
                    Err(e) => {
                        MirrorStats::bump(&self.stats.failed, 1);
                        warn!(url = %child.url, error = %e, "could not admit crawl task");
                        continue;
                    }
                };

                children.push(tokio::spawn(Arc::clone(&self).crawl(child, Some(token))));
            }

            // Step 4: wait for the whole subtree, in completion order
            while let Some(joined) = children.next().await {
                // A panicked child never reached its own failure accounting
                if let Err(e) = joined {
                    MirrorStats::bump(&self.stats.failed, 1);
                    warn!(error = %e, "crawl task panicked");
                }
            }
        }
        .boxed()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does crawl() return BoxFuture instead of being an async fn?
//    - An async fn that spawns itself would have an infinitely sized future type
//    - .boxed() puts the future on the heap, giving it a fixed size
//    - BoxFuture<'static, ()> is also Send, which tokio::spawn requires
//
// 2. What is FuturesUnordered?
//    - A collection of futures that yields results as each one finishes
//    - Here it holds the JoinHandles of this task's children
//    - Draining it means "this subtree is done"
//
// 3. Why Arc<Shared> and `self: Arc<Self>`?
//    - Every spawned task needs the fetcher, storage, limiter and counters
//    - Arc::clone only bumps a reference count, nothing is copied
//
// 4. What happens if a child task panics?
//    - tokio catches the panic and the JoinHandle returns Err(JoinError)
//    - The token inside the task is dropped during unwinding
//    - We count the target as failed and keep crawling
//
// 5. Why AtomicUsize counters instead of a Mutex<CrawlSummary>?
//    - Each counter is bumped independently, so no lock is needed
//    - Ordering::Relaxed is enough: the totals are only read after all tasks
//      have been joined
// -----------------------------------------------------------------------------
