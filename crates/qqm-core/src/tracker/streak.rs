//! Consecutive-slow counters per task.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct SlowStreaks {
    counts: HashMap<String, u32>,
}

impl SlowStreaks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the streak from an instantaneous sample.
    ///
    /// At or above `threshold_kbps` the streak drops to 0 (the entry stays, at 0).
    /// Below it the streak grows by one, starting at 1 for an untracked task.
    pub fn update(&mut self, hash: &str, speed_kbps: f64, threshold_kbps: f64) -> u32 {
        let count = self.counts.entry(hash.to_string()).or_insert(0);
        if speed_kbps >= threshold_kbps {
            *count = 0;
        } else {
            *count = count.saturating_add(1);
        }
        *count
    }

    /// Current streak; `None` when the task is untracked.
    pub fn get(&self, hash: &str) -> Option<u32> {
        self.counts.get(hash).copied()
    }

    /// Forget a task entirely (after a demotion).
    pub fn clear(&mut self, hash: &str) -> bool {
        self.counts.remove(hash).is_some()
    }

    pub fn retain(&mut self, active: &HashSet<String>) -> usize {
        let before = self.counts.len();
        self.counts.retain(|hash, _| active.contains(hash));
        before - self.counts.len()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
