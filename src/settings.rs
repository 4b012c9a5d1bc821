use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub user_name: String,
    /// Company used when a command is run without `--company`.
    #[serde(default)]
    pub default_company: Option<i64>,
    #[serde(default = "default_retry_attempts")]
    pub db_retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub db_retry_delay_ms: u64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_tax_rate() -> f64 {
    0.2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            default_company: None,
            db_retry_attempts: default_retry_attempts(),
            db_retry_delay_ms: default_retry_delay_ms(),
            tax_rate: default_tax_rate(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("ledgerdash.db")
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.db_retry_delay_ms)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerdash")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("ledgerdash")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring unreadable settings at {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Resolve the company a command acts on: explicit flag first, then the
/// configured default.
pub fn resolve_company(explicit: Option<i64>) -> Result<i64> {
    explicit
        .or(load_settings().default_company)
        .ok_or_else(|| {
            AppError::Validation(
                "no company selected; pass --company or run `ledgerdash company add`".to_string(),
            )
        })
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
