use std::sync::atomic::{AtomicU64, Ordering};

/// In-process count of completed (non cache-hit) searches.
#[derive(Default, Debug)]
pub struct SearchCounter {
    searches: AtomicU64,
}

impl SearchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.searches.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.searches.load(Ordering::Relaxed)
    }
}
