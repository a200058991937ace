//! `qqm run` – the check loop.

use anyhow::{Context, Result};
use qqm_core::client::{Connector, DryRun, QbitConnector};
use qqm_core::config::QqmConfig;
use qqm_core::engine::DemotionEngine;
use qqm_core::monitor::Monitor;
use qqm_core::policy::DemotionPolicy;

pub async fn run_monitor(cfg: &QqmConfig, once: bool, dry_run: bool) -> Result<()> {
    let connector = QbitConnector::new(&cfg.url, &cfg.username, &cfg.password)
        .context("building qBittorrent client")?;
    let interval = cfg.check_interval();
    let engine = DemotionEngine::new(DemotionPolicy::new(cfg.min_speed_kbps as f64), interval);
    let max_cycles = once.then_some(1);

    let cycles = if dry_run {
        drive(Monitor::new(engine, DryRun(connector), interval), max_cycles).await?
    } else {
        drive(Monitor::new(engine, connector, interval), max_cycles).await?
    };
    tracing::info!("stopped after {} check cycle(s)", cycles);
    Ok(())
}

/// The loop blocks on curl and sleeps between cycles, so it gets its own thread.
async fn drive<C>(mut monitor: Monitor<C>, max_cycles: Option<u64>) -> Result<u64>
where
    C: Connector + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        monitor.log_startup();
        monitor.run(max_cycles)
    })
    .await
    .context("check loop thread failed")
}
