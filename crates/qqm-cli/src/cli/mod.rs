//! CLI for QQM, the qBittorrent slow-torrent queue manager.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qqm_core::config::{self, LoadedConfig, QqmConfig};
use qqm_core::logging;
use std::path::PathBuf;

use commands::{run_config, run_monitor, run_tasks};

/// Top-level CLI for QQM.
#[derive(Debug, Parser)]
#[command(name = "qqm")]
#[command(
    about = "QQM: moves persistently slow torrents to the bottom of the qBittorrent queue",
    long_about = None
)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/qqm/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// qBittorrent Web UI URL (overrides config file and QB_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll torrents periodically and demote the persistently slow ones.
    Run {
        /// Run a single check cycle and exit.
        #[arg(long)]
        once: bool,
        /// Log demotions instead of sending them to qBittorrent.
        #[arg(long)]
        dry_run: bool,
        /// Minimum speed in KB/s (overrides config and MIN_SPEED).
        #[arg(long, value_name = "KBPS")]
        min_speed: Option<u64>,
        /// Seconds between checks (overrides config and CHECK_INTERVAL).
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Colour terminal output (the log file stays plain).
        #[arg(long)]
        color: bool,
    },

    /// List torrents with their state, speed and whether they are evaluated.
    Tasks,

    /// Show the effective configuration (password masked).
    Config,
}

/// Resolve the config file, then apply environment and CLI overrides.
fn load_config(cli: &Cli) -> Result<LoadedConfig> {
    let mut loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: config::load_from_path(path)?,
            path: path.clone(),
            created: false,
        },
        None => config::load_or_init()?,
    };
    let cfg = &mut loaded.config;
    cfg.apply_process_env()?;
    if let Some(url) = &cli.url {
        cfg.url = url.clone();
    }
    if let CliCommand::Run {
        min_speed,
        interval,
        ..
    } = &cli.command
    {
        if let Some(v) = min_speed {
            cfg.min_speed_kbps = *v;
        }
        if let Some(v) = interval {
            cfg.check_interval_secs = *v;
        }
    }
    cfg.validate()?;
    Ok(loaded)
}

/// Logged once a subscriber is installed; loading happens before that.
fn log_config_source(loaded: &LoadedConfig) {
    if loaded.created {
        tracing::info!("created default config at {}", loaded.path.display());
    } else {
        tracing::debug!("loaded config from {}", loaded.path.display());
    }
}

fn init_logging(cfg: &QqmConfig, ansi: bool) {
    if let Err(e) = logging::init_logging(cfg.log_path.as_deref(), ansi) {
        logging::init_logging_stdout(ansi);
        tracing::warn!("log file unavailable ({:#}), logging to stdout only", e);
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let loaded = load_config(&cli)?;
        let cfg = &loaded.config;

        match cli.command {
            CliCommand::Run { once, dry_run, color, .. } => {
                init_logging(cfg, color);
                log_config_source(&loaded);
                run_monitor(cfg, once, dry_run).await?;
            }
            CliCommand::Tasks => {
                init_logging(cfg, false);
                log_config_source(&loaded);
                run_tasks(cfg).await?;
            }
            CliCommand::Config => {
                if loaded.created {
                    println!("created default config at {}", loaded.path.display());
                }
                run_config(cfg, &loaded.path)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
