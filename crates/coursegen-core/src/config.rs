use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Priority;

/// Global configuration loaded from `~/.config/coursegen/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// Worker count for the static-partition strategy (`start`).
    pub workers: usize,
    /// Concurrent fan-out per batch for the batch strategy (`resume`/`retry`).
    pub batch_size: usize,
    /// Pause after every task in a worker's slice, in milliseconds.
    pub task_cooldown_ms: u64,
    /// Pause between batches, in seconds.
    pub batch_delay_secs: u64,
    /// Default catalog ordering; overridable per run with `--priority`.
    #[serde(default)]
    pub priority: Priority,
    /// Generation service endpoint.
    pub generator_url: String,
    /// Optional model name forwarded to the generation service.
    #[serde(default)]
    pub generator_model: Option<String>,
    /// Override for the state file location (defaults to the XDG state dir).
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            batch_size: 3,
            task_cooldown_ms: 2000,
            batch_delay_secs: 30,
            priority: Priority::default(),
            generator_url: "http://127.0.0.1:8080/v1/generate".to_string(),
            generator_model: None,
            state_path: None,
        }
    }
}

impl GenConfig {
    pub fn task_cooldown(&self) -> Duration {
        Duration::from_millis(self.task_cooldown_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("coursegen")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GenConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GenConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GenConfig = toml::from_str(&data)?;
    Ok(cfg)
}
