//! Task snapshots as reported by the download client, and the state vocabulary
//! that decides which of them are evaluated for demotion.

use std::collections::BTreeSet;

/// States in which a torrent is considered active and eligible for evaluation.
pub const ACTIVE_STATES: &[&str] = &[
    "downloading",
    "metaDL",
    "stalledDL",
    "forcedDL",
    "checkingDL",
    "pausedDL",
    "downloading_metadata",
];

/// States that are never evaluated, even if they also appear in the active set.
pub const EXCLUDED_STATES: &[&str] = &["queued", "queuedDL", "queuedUP"];

/// One task as reported by a single poll of the download client.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    /// Stable identifier (torrent info-hash).
    pub hash: String,
    /// Human-readable name, for logs only.
    pub name: String,
    /// Raw state tag from the client (e.g. `stalledDL`).
    pub state: String,
    /// Instantaneous download rate in bytes per second.
    pub dlspeed: u64,
}

impl TaskSnapshot {
    /// Download rate in KB/s (bytes / 1024).
    pub fn speed_kbps(&self) -> f64 {
        self.dlspeed as f64 / 1024.0
    }
}

/// Active/excluded state classification.
///
/// A task is evaluated only if its state is active **and** not excluded. The
/// default sets are disjoint; the exclusion check still applies so that an
/// extended active set cannot pull queued tasks into evaluation.
#[derive(Debug, Clone)]
pub struct StateFilter {
    active: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl Default for StateFilter {
    fn default() -> Self {
        Self {
            active: ACTIVE_STATES.iter().map(|s| s.to_string()).collect(),
            excluded: EXCLUDED_STATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StateFilter {
    /// Extend the active set with extra states.
    pub fn with_active<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn is_evaluated(&self, state: &str) -> bool {
        self.active.contains(state) && !self.excluded.contains(state)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_classifies_states() {
        let f = StateFilter::default();
        for s in ACTIVE_STATES {
            assert!(f.is_evaluated(s), "{s} should be evaluated");
        }
        for s in EXCLUDED_STATES {
            assert!(!f.is_evaluated(s), "{s} should not be evaluated");
        }
        assert!(!f.is_evaluated("uploading"));
        assert!(!f.is_evaluated("stalledUP"));
        assert!(!f.is_evaluated("error"));
    }

    #[test]
    fn excluded_wins_over_extended_active_set() {
        let f = StateFilter::default().with_active(["queuedDL", "uploading"]);
        assert!(!f.is_evaluated("queuedDL"));
        assert!(f.is_evaluated("uploading"));
    }

    #[test]
    fn speed_is_converted_to_kib() {
        let t = TaskSnapshot {
            hash: "h".into(),
            name: "n".into(),
            state: "downloading".into(),
            dlspeed: 512_000,
        };
        assert!((t.speed_kbps() - 500.0).abs() < 1e-9);
    }
}
