use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "prograin.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub projects_file: PathBuf,
    /// Transaction ledger used to fill in missing spend figures.
    pub transactions_file: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            projects_file: PathBuf::from("obras.csv"),
            transactions_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            preview_rows: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Evaluation date as `YYYY-MM-DD`; today when unset.
    pub as_of: Option<NaiveDate>,
    pub default_duration_months: i32,
    pub snapshot_file: PathBuf,
    pub snapshot_max_age_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            default_duration_months: 6,
            snapshot_file: PathBuf::from("rendimiento_snapshots.json"),
            snapshot_max_age_days: 1,
        }
    }
}

impl ReportConfig {
    pub fn as_of_or_today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// An explicit path must exist; otherwise `prograin.toml` in `cwd` is used
/// if present, and defaults if not.
pub fn load_config(explicit_path: Option<&Path>, cwd: &Path) -> Result<Config> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            bail!("config file not found at {}", path.display());
        }
        return read_config(path);
    }

    let local_path = cwd.join(CONFIG_FILE_NAME);
    if local_path.exists() {
        return read_config(&local_path);
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("invalid TOML in {}", path.display()))?;
    if config.report.default_duration_months <= 0 {
        bail!(
            "report.default_duration_months must be positive, got {}",
            config.report.default_duration_months
        );
    }
    Ok(config)
}
