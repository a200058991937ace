//! Throughput-based demotion engine.
//!
//! Each cycle the engine lists tasks, and for every task in an evaluated state:
//! 1. records the instantaneous speed in the task's window (average is logged)
//! 2. updates the slow streak from the instantaneous speed
//! 3. demotes the task once the streak reaches the required count, then
//!    forgets the streak whether or not the client accepted the move
//!
//! After all tasks are processed, state for tasks that were not evaluated this
//! cycle is dropped. A cycle that fails before tasks are listed leaves all
//! tracked state as it was.

mod error;
mod report;

use std::collections::HashSet;
use std::time::Duration;

use crate::client::{Connector, QueueActions, TaskSource};
use crate::policy::{DemotionPolicy, Phase};
use crate::task::{StateFilter, TaskSnapshot};
use crate::tracker::{SlowStreaks, SpeedHistory};

pub use error::CycleError;
pub use report::{CycleReport, TaskOutcome};

/// Owns the per-task tables and applies the demotion policy.
#[derive(Debug, Clone)]
pub struct DemotionEngine {
    policy: DemotionPolicy,
    filter: StateFilter,
    history: SpeedHistory,
    streaks: SlowStreaks,
    /// Poll interval, only used to express the slow window in log lines.
    interval: Duration,
}

impl DemotionEngine {
    pub fn new(policy: DemotionPolicy, interval: Duration) -> Self {
        Self {
            policy,
            filter: StateFilter::default(),
            history: SpeedHistory::default(),
            streaks: SlowStreaks::new(),
            interval,
        }
    }

    pub fn with_filter(mut self, filter: StateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn policy(&self) -> &DemotionPolicy {
        &self.policy
    }

    pub fn filter(&self) -> &StateFilter {
        &self.filter
    }

    pub fn history(&self) -> &SpeedHistory {
        &self.history
    }

    pub fn streaks(&self) -> &SlowStreaks {
        &self.streaks
    }

    /// Connect, list tasks and process them. Nothing is mutated on error.
    pub fn run_cycle<C: Connector>(&mut self, connector: &C) -> Result<CycleReport, CycleError> {
        let mut session = connector.connect().map_err(CycleError::Connect)?;
        let tasks = session.list_tasks().map_err(CycleError::Fetch)?;
        Ok(self.process(&tasks, &mut session))
    }

    /// Evaluate a full task listing, then drop state for tasks no longer active.
    pub fn process<A: QueueActions + ?Sized>(
        &mut self,
        tasks: &[TaskSnapshot],
        actions: &mut A,
    ) -> CycleReport {
        let mut report = CycleReport {
            seen: tasks.len(),
            ..CycleReport::default()
        };
        tracing::debug!("found {} total torrents", tasks.len());

        let evaluated: Vec<&TaskSnapshot> = tasks
            .iter()
            .filter(|t| self.filter.is_evaluated(&t.state))
            .collect();
        tracing::debug!("found {} active torrents", evaluated.len());

        let mut active: HashSet<String> = HashSet::with_capacity(evaluated.len());
        for task in evaluated {
            active.insert(task.hash.clone());
            let outcome = self.evaluate(task, actions);
            report.tally(&task.hash, outcome);
        }

        report.dropped = self.history.retain(&active);
        self.streaks.retain(&active);
        report
    }

    /// Evaluate one task: window update, streak update, policy decision.
    pub fn evaluate<A: QueueActions + ?Sized>(
        &mut self,
        task: &TaskSnapshot,
        actions: &mut A,
    ) -> TaskOutcome {
        let speed = task.speed_kbps();
        let avg = self.history.record(&task.hash, speed);
        let threshold = self.policy.min_speed_kbps;
        tracing::debug!(
            torrent = %task.name,
            state = %task.state,
            speed_kbps = speed.round(),
            avg_kbps = avg.round(),
            slow = self.policy.is_slow(speed),
            "checking torrent"
        );

        let streak = self.streaks.update(&task.hash, speed, threshold);
        let required = self.policy.required_slow_count;
        match self.policy.phase(streak) {
            Phase::Fresh => {
                tracing::debug!(
                    torrent = %task.name,
                    speed_kbps = speed.round(),
                    "reset slow count"
                );
                TaskOutcome::Healthy
            }
            Phase::Slow(n) => {
                tracing::debug!(
                    torrent = %task.name,
                    streak = n,
                    required,
                    "slow {}/{}",
                    n,
                    required
                );
                TaskOutcome::Slow(n)
            }
            Phase::Demote => self.demote(task, streak, actions),
        }
    }

    fn demote<A: QueueActions + ?Sized>(
        &mut self,
        task: &TaskSnapshot,
        streak: u32,
        actions: &mut A,
    ) -> TaskOutcome {
        let minutes = self.policy.slow_window(self.interval).as_secs_f64() / 60.0;
        tracing::info!(
            torrent = %task.name,
            hash = %task.hash,
            streak,
            required = self.policy.required_slow_count,
            "slow for {:.0} minutes, moving to bottom of queue",
            minutes
        );
        let result = actions.move_to_bottom(&[task.hash.as_str()]);
        // The attempt is consumed either way; a new streak must build up again.
        self.streaks.clear(&task.hash);
        match result {
            Ok(()) => {
                tracing::info!(torrent = %task.name, "moved to bottom of queue");
                TaskOutcome::Demoted
            }
            Err(e) => {
                tracing::error!(torrent = %task.name, error = %e, "failed to move torrent");
                TaskOutcome::DemotionFailed
            }
        }
    }
}
