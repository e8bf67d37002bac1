/// Thread-safe load progress counters
///
/// The loader updates them while validating a batch; other threads poll
/// `snapshot()` through a shared `Arc<LoadProgress>`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgressSnapshot {
    /// Assets in the batches currently being validated
    pub scheduled: usize,
    /// Assets of those batches already handled
    pub completed: usize,
    pub in_progress: bool,
}

impl LoadProgressSnapshot {
    /// Completed share of the scheduled assets, 1.0 when idle
    pub fn fraction(&self) -> f32 {
        if self.scheduled == 0 {
            1.0
        } else {
            self.completed as f32 / self.scheduled as f32
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadProgress {
    scheduled: AtomicUsize,
    completed: AtomicUsize,
    active_batches: AtomicUsize,
    in_progress: AtomicBool,
}

impl LoadProgress {
    pub const fn new() -> Self {
        Self {
            scheduled: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            active_batches: AtomicUsize::new(0),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Announce a batch of `count` assets
    pub fn begin_batch(&self, count: usize) {
        self.scheduled.fetch_add(count, Ordering::Relaxed);
        self.active_batches.fetch_add(1, Ordering::AcqRel);
        self.in_progress.store(true, Ordering::Release);
    }

    pub fn complete_one(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove a finished batch of `count` assets from the counters
    pub fn end_batch(&self, count: usize) {
        self.scheduled.fetch_sub(count, Ordering::Relaxed);
        self.completed.fetch_sub(count, Ordering::Relaxed);
        if self.active_batches.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_progress.store(false, Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> LoadProgressSnapshot {
        LoadProgressSnapshot {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            in_progress: self.in_progress.load(Ordering::Acquire),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "load_progress_tests.rs"]
mod tests;
