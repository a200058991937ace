//! CLI command handlers, one per file.

mod config;
mod run;
mod tasks;

pub use config::run_config;
pub use run::run_monitor;
pub use tasks::run_tasks;
