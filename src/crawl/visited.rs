// src/crawl/visited.rs
// =============================================================================
// The set of URLs already scheduled during this run.
//
// The only way in is `try_claim`, which checks and marks a URL in a single
// critical section. Two tasks that discover the same URL at the same moment
// can never both get `true`, so they can never both fetch and write it.
//
// Entries live until the crawl ends; there is no removal and no size bound.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use url::Url;

/// Claim registry injected into the scheduler.
///
/// Implementations must make `try_claim` atomic: exactly one caller ever
/// observes `true` for a given URL.
pub trait ClaimRegistry: Send + Sync {
    /// Claims `url`. Returns `true` only for the first caller.
    fn try_claim(&self, url: &Url) -> bool;

    /// Number of URLs claimed so far.
    fn len(&self) -> usize;
}

/// Mutex-guarded set of claimed URL strings.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the set half-updated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ClaimRegistry for VisitedSet {
    fn try_claim(&self, url: &Url) -> bool {
        // insert() returns false when the value was already present
        self.lock().insert(url.as_str().to_owned())
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not check contains() and then insert()?
//    - Two lock acquisitions leave a gap between them
//    - Two tasks could both see "not present" and both fetch the page
//    - insert() checks and marks under one lock, and returns false if present
//
// 2. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - The lock is never held across an .await, only for one HashSet call
//    - A blocking mutex is cheaper for that and keeps try_claim synchronous
//
// 3. What is a "poisoned" lock?
//    - If a thread panics while holding a std Mutex, later lock() calls
//      return Err(PoisonError)
//    - into_inner() on that error still hands out the guard
//    - A panic cannot stop a single insert() halfway, so the set is still
//      consistent and the crawl keeps claiming URLs
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_first_claim_wins() {
        let visited = VisitedSet::new();
        assert!(visited.try_claim(&url("http://site/a")));
        assert!(!visited.try_claim(&url("http://site/a")));
        assert!(visited.try_claim(&url("http://site/b")));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_fragment_is_a_distinct_url() {
        // No canonicalisation beyond what the parser does
        let visited = VisitedSet::new();
        assert!(visited.try_claim(&url("http://site/a")));
        assert!(visited.try_claim(&url("http://site/a#top")));
    }

    #[test]
    fn test_concurrent_claims_yield_one_winner() {
        for _ in 0..50 {
            let visited = Arc::new(VisitedSet::new());
            let barrier = Arc::new(Barrier::new(2));
            let target = url("http://site/a");

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let visited = Arc::clone(&visited);
                    let barrier = Arc::clone(&barrier);
                    let target = target.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        visited.try_claim(&target)
                    })
                })
                .collect();

            let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(results.iter().filter(|won| **won).count(), 1);
            assert_eq!(visited.len(), 1);
        }
    }

    #[test]
    fn test_claims_survive_a_poisoned_lock() {
        let visited = Arc::new(VisitedSet::new());
        assert!(visited.try_claim(&url("http://site/before")));

        // Panic while holding the lock so the mutex is poisoned
        let poisoner = Arc::clone(&visited);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.seen.lock().unwrap();
            panic!("task died while holding the visited lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(visited.seen.is_poisoned());

        assert!(visited.try_claim(&url("http://site/after")));
        assert!(!visited.try_claim(&url("http://site/before")));
        assert!(!visited.try_claim(&url("http://site/after")));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_many_threads_many_urls() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| visited.try_claim(&url(&format!("http://site/{}", i))))
                        .count()
                })
            })
            .collect();

        let wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(wins, 100);
        assert_eq!(visited.len(), 100);
    }
}
