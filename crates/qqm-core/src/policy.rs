use std::time::Duration;

/// Consecutive slow polls required before a task is demoted.
pub const REQUIRED_SLOW_COUNT: u32 = 3;

/// Default minimum acceptable speed in KB/s.
pub const DEFAULT_MIN_SPEED_KBPS: u64 = 800;

/// Per-task phase derived from its slow streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Streak is zero (or the task is untracked).
    Fresh,
    /// Below threshold for `n` consecutive polls, `1 <= n < required`.
    Slow(u32),
    /// Streak reached the required count; demote and forget the streak.
    Demote,
}

/// Demotion threshold and trigger count.
///
/// Only the instantaneous speed feeds the streak; the window average is
/// reported alongside but never compared against the threshold.
#[derive(Debug, Clone, Copy)]
pub struct DemotionPolicy {
    /// Speeds strictly below this (KB/s) count as slow.
    pub min_speed_kbps: f64,
    /// Streak length that triggers a demotion.
    pub required_slow_count: u32,
}

impl Default for DemotionPolicy {
    fn default() -> Self {
        Self {
            min_speed_kbps: DEFAULT_MIN_SPEED_KBPS as f64,
            required_slow_count: REQUIRED_SLOW_COUNT,
        }
    }
}

impl DemotionPolicy {
    pub fn new(min_speed_kbps: f64) -> Self {
        Self {
            min_speed_kbps,
            ..Self::default()
        }
    }

    pub fn is_slow(&self, speed_kbps: f64) -> bool {
        speed_kbps < self.min_speed_kbps
    }

    /// Map a streak count onto a phase.
    pub fn phase(&self, streak: u32) -> Phase {
        let required = self.required_slow_count.max(1);
        match streak {
            0 => Phase::Fresh,
            n if n >= required => Phase::Demote,
            n => Phase::Slow(n),
        }
    }

    /// How long a task must stay slow before demotion at the given poll interval.
    pub fn slow_window(&self, interval: Duration) -> Duration {
        interval.saturating_mul(self.required_slow_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_streak() {
        let p = DemotionPolicy::default();
        assert_eq!(p.phase(0), Phase::Fresh);
        assert_eq!(p.phase(1), Phase::Slow(1));
        assert_eq!(p.phase(2), Phase::Slow(2));
        assert_eq!(p.phase(3), Phase::Demote);
        assert_eq!(p.phase(7), Phase::Demote);
    }

    #[test]
    fn threshold_is_strict() {
        let p = DemotionPolicy::new(800.0);
        assert!(p.is_slow(799.9));
        assert!(!p.is_slow(800.0));
    }

    #[test]
    fn slow_window_is_required_count_times_interval() {
        let p = DemotionPolicy::default();
        assert_eq!(
            p.slow_window(Duration::from_secs(180)),
            Duration::from_secs(540)
        );
    }

    #[test]
    fn zero_required_count_still_needs_one_slow_poll() {
        let p = DemotionPolicy {
            min_speed_kbps: 800.0,
            required_slow_count: 0,
        };
        assert_eq!(p.phase(0), Phase::Fresh);
        assert_eq!(p.phase(1), Phase::Demote);
    }
}
