//! Per-task and per-cycle results.

/// What happened to one task during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// At or above threshold; streak is 0.
    Healthy,
    /// Below threshold, streak still short of the trigger.
    Slow(u32),
    /// Streak reached the trigger and the task was moved to the bottom.
    Demoted,
    /// Streak reached the trigger but the client refused the move. The streak
    /// is cleared anyway.
    DemotionFailed,
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Tasks reported by the client.
    pub seen: usize,
    /// Tasks in an evaluated state.
    pub evaluated: usize,
    /// Tasks below threshold that did not trigger a demotion.
    pub slow: usize,
    /// Hashes moved to the bottom of the queue.
    pub demoted: Vec<String>,
    /// Hashes whose demotion was attempted but failed.
    pub failed: Vec<String>,
    /// Tracked tasks forgotten because they are no longer active.
    pub dropped: usize,
}

impl CycleReport {
    pub(crate) fn tally(&mut self, hash: &str, outcome: TaskOutcome) {
        self.evaluated += 1;
        match outcome {
            TaskOutcome::Healthy => {}
            TaskOutcome::Slow(_) => self.slow += 1,
            TaskOutcome::Demoted => self.demoted.push(hash.to_string()),
            TaskOutcome::DemotionFailed => self.failed.push(hash.to_string()),
        }
    }
}
