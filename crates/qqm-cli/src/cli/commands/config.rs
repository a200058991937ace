//! `qqm config` – show the effective configuration.

use anyhow::Result;
use qqm_core::config::QqmConfig;
use qqm_core::policy::REQUIRED_SLOW_COUNT;
use std::path::Path;

pub fn run_config(cfg: &QqmConfig, source: &Path) -> Result<()> {
    let cfg = cfg.redacted();
    let log_path = match &cfg.log_path {
        Some(p) => p.display().to_string(),
        None => qqm_core::logging::default_log_path()?.display().to_string(),
    };
    println!("{:<20} {}", "config file", source.display());
    println!("{:<20} {}", "url", cfg.url);
    println!("{:<20} {}", "username", cfg.username);
    println!("{:<20} {}", "password", cfg.password);
    println!("{:<20} {} KB/s", "min speed", cfg.min_speed_kbps);
    println!("{:<20} {} s", "check interval", cfg.check_interval_secs);
    println!("{:<20} {}", "slow polls to demote", REQUIRED_SLOW_COUNT);
    println!("{:<20} {}", "log file", log_path);
    Ok(())
}
