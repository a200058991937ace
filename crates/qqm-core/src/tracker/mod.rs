//! Per-task observation state.
//!
//! Two small in-memory tables keyed by task hash:
//! - a bounded window of recent speeds (for the logged average)
//! - a consecutive-slow counter (drives demotion)
//!
//! Both are owned by the engine and rebuilt from live observations; nothing is
//! persisted.

mod history;
mod streak;

pub use history::{SpeedHistory, DEFAULT_WINDOW};
pub use streak::SlowStreaks;
