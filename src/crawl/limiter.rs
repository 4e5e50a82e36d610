// src/crawl/limiter.rs
// =============================================================================
// Admission control for recursive crawl tasks.
//
// A fixed number of tokens is handed out; a task must hold one while it
// fetches, stores and parses a page. The token is an owned semaphore permit,
// so dropping it (on success, on error, even while unwinding from a panic)
// returns the capacity. There is no code path that can leak a token.
// =============================================================================

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{MirrorError, Result};

/// Bounded token gate shared by every crawl task.
#[derive(Debug, Clone)]
pub struct AdmissionLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of admitted work. Capacity is returned when this is dropped.
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionToken {
    /// Returns the token explicitly. Equivalent to dropping it.
    pub fn release(self) {}
}

impl AdmissionLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a token is free and reserves it.
    pub async fn acquire(&self) -> Result<AdmissionToken> {
        // acquire_owned needs the Arc itself, so the permit can outlive `self`
        // and travel into a spawned task
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            // Only fails once the semaphore is closed, which nothing here does
            .map_err(|_| MirrorError::AdmissionClosed)?;
        Ok(AdmissionToken { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens not currently handed out.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a Semaphore?
//    - A counter of "permits" shared between tasks
//    - acquire() takes one, waiting if none are left
//    - Dropping the permit puts it back and wakes one waiter
//
// 2. Why OwnedSemaphorePermit instead of SemaphorePermit?
//    - SemaphorePermit borrows the semaphore, so it cannot move into
//      tokio::spawn (which needs 'static data)
//    - The owned permit holds its own Arc and can go anywhere
//
// 3. Why is release() an empty function?
//    - Taking `self` by value moves the token in, and it is dropped at the end
//    - It only exists to make "give the token back here" visible in code
//
// 4. What does RAII mean here?
//    - Resource Acquisition Is Initialization: the token IS the capacity
//    - Early returns, `?` and panics all drop it, so capacity always returns
// -----------------------------------------------------------------------------
