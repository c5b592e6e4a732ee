use std::sync::atomic::{AtomicU64, Ordering};

/// Receives "numbers processed" deltas after each segment.
pub trait StatusReporter: Send + Sync {
    fn update(&self, processed: u64);
}

/// Progress over a known span, shared by all workers of a run.
#[derive(Debug)]
pub struct Status {
    total: u64,
    processed: AtomicU64,
    percent: AtomicU64,
}

impl Status {
    pub fn new(total: u64) -> Self {
        Status {
            total: total.max(1),
            processed: AtomicU64::new(0),
            percent: AtomicU64::new(0),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Whole percent done, capped at 100.
    pub fn percent(&self) -> u64 {
        self.percent.load(Ordering::Relaxed)
    }
}

impl StatusReporter for Status {
    fn update(&self, processed: u64) {
        let done = self.processed.fetch_add(processed, Ordering::Relaxed) + processed;
        let percent = (done.min(self.total) as u128 * 100 / self.total as u128) as u64;
        let previous = self.percent.fetch_max(percent, Ordering::Relaxed);
        if percent > previous {
            tracing::info!(percent, "sieving");
        } else {
            tracing::trace!(done, total = self.total, "segment done");
        }
    }
}
