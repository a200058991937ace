//! `qqm tasks` – list torrents as the engine sees them.

use anyhow::{Context, Result};
use qqm_core::client::{Connector, QbitConnector, TaskSource};
use qqm_core::config::QqmConfig;
use qqm_core::task::{StateFilter, TaskSnapshot};

pub async fn run_tasks(cfg: &QqmConfig) -> Result<()> {
    let connector = QbitConnector::new(&cfg.url, &cfg.username, &cfg.password)
        .context("building qBittorrent client")?;
    let tasks = tokio::task::spawn_blocking(move || -> Result<Vec<TaskSnapshot>> {
        let mut session = connector.connect().context("connecting to qBittorrent")?;
        Ok(session.list_tasks().context("listing torrents")?)
    })
    .await??;

    if tasks.is_empty() {
        println!("No torrents.");
        return Ok(());
    }

    let filter = StateFilter::default();
    let threshold = cfg.min_speed_kbps as f64;
    println!(
        "{:<10} {:<22} {:>10} {:<6} {}",
        "HASH", "STATE", "KB/S", "EVAL", "NAME"
    );
    for t in tasks {
        let speed = t.speed_kbps();
        let eval = if !filter.is_evaluated(&t.state) {
            "-"
        } else if speed < threshold {
            "slow"
        } else {
            "ok"
        };
        println!(
            "{:<10} {:<22} {:>10.0} {:<6} {}",
            t.hash.get(..8).unwrap_or(&t.hash),
            t.state,
            speed,
            eval,
            t.name
        );
    }
    Ok(())
}
