use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::policy::DEFAULT_MIN_SPEED_KBPS;

/// Global configuration loaded from `~/.config/qqm/config.toml`, then
/// overridden by a `.env` file and by environment variables (`QB_URL`,
/// `MIN_SPEED`, ...). Real environment variables win over `.env` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QqmConfig {
    /// Base URL of the qBittorrent Web UI.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Torrents below this speed (KB/s) count as slow.
    pub min_speed_kbps: u64,
    /// Seconds between check cycles.
    pub check_interval_secs: u64,
    /// Log file path. Defaults to `~/.local/state/qqm/qqm.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for QqmConfig {
    fn default() -> Self {
        Self {
            url: "http://gluetun:8080".to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
            min_speed_kbps: DEFAULT_MIN_SPEED_KBPS,
            check_interval_secs: 180,
            log_path: None,
        }
    }
}

impl QqmConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QB_URL") {
            self.url = v;
        }
        if let Some(v) = lookup("QB_USERNAME") {
            self.username = v;
        }
        if let Some(v) = lookup("QB_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = lookup("MIN_SPEED") {
            self.min_speed_kbps = v
                .trim()
                .parse()
                .with_context(|| format!("MIN_SPEED must be an integer (KB/s), got {v:?}"))?;
        }
        if let Some(v) = lookup("CHECK_INTERVAL") {
            self.check_interval_secs = v
                .trim()
                .parse()
                .with_context(|| format!("CHECK_INTERVAL must be an integer (seconds), got {v:?}"))?;
        }
        if let Some(v) = lookup("LOG_PATH") {
            self.log_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Apply the process environment, falling back to `dotenv` entries for
    /// variables that are not set.
    pub fn apply_env_layers<F>(&mut self, process: F, dotenv: &HashMap<String, String>) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_env(|key| process(key).or_else(|| dotenv.get(key).cloned()))
    }

    /// Apply `.env` from the working directory (if any) and the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        let dotenv = read_dotenv(Path::new(".env"))?;
        self.apply_env_layers(|key| std::env::var(key).ok(), &dotenv)
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_interval_secs == 0 {
            bail!("check_interval_secs must be greater than 0");
        }
        url::Url::parse(&self.url).with_context(|| format!("invalid client url {:?}", self.url))?;
        Ok(())
    }

    /// Copy with the password masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            password: "********".to_string(),
            ..self.clone()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qqm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read `KEY=value` pairs from a dotenv file. A missing file yields no entries.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let vars = iter
        .collect::<Result<HashMap<_, _>, _>>()
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(vars)
}

/// Configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: QqmConfig,
    pub path: PathBuf,
    /// A default file was written because none existed.
    pub created: bool,
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LoadedConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path. Logging is usually not up yet,
/// so the caller reports `created` once it is.
pub fn load_or_init_at(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        let default_cfg = QqmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        return Ok(LoadedConfig {
            config: default_cfg,
            path: path.to_path_buf(),
            created: true,
        });
    }
    Ok(LoadedConfig {
        config: load_from_path(path)?,
        path: path.to_path_buf(),
        created: false,
    })
}

/// Load configuration from an explicit file, which must exist.
pub fn load_from_path(path: &Path) -> Result<QqmConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: QqmConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
