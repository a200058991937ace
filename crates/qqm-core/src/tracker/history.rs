//! Sliding window of recent speed samples per task.

use std::collections::{HashMap, HashSet, VecDeque};

/// Number of samples kept per task (three polls).
pub const DEFAULT_WINDOW: usize = 3;

#[derive(Debug, Clone)]
pub struct SpeedHistory {
    windows: HashMap<String, VecDeque<f64>>,
    capacity: usize,
}

impl Default for SpeedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SpeedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample (KB/s) and return the mean of the current window.
    ///
    /// The mean is taken over however many samples exist (1..=capacity).
    pub fn record(&mut self, hash: &str, speed_kbps: f64) -> f64 {
        let capacity = self.capacity;
        let window = self
            .windows
            .entry(hash.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        window.push_back(speed_kbps);
        while window.len() > capacity {
            window.pop_front();
        }
        window.iter().sum::<f64>() / window.len() as f64
    }

    pub fn window(&self, hash: &str) -> Option<&VecDeque<f64>> {
        self.windows.get(hash)
    }

    /// Forget one task's window. Returns whether it was tracked.
    pub fn remove(&mut self, hash: &str) -> bool {
        self.windows.remove(hash).is_some()
    }

    /// Drop every window whose hash is not in `active`. Returns how many were dropped.
    pub fn retain(&mut self, active: &HashSet<String>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|hash, _| active.contains(hash));
        before - self.windows.len()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
