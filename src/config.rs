//! Panel settings kept between launches (`ad5372_panel.json`).
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::dac::bank::DEFAULT_DATA_FILE;
use crate::dac::SHUTTER_COUNT;
pub const DEFAULT_CONFIG_FILE: &str = "ad5372_panel.json";
/// Overrides [`DEFAULT_CONFIG_FILE`] when set.
pub const CONFIG_ENV_VAR: &str = "AD5372_PANEL_CONFIG";
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Channel vector opened at start-up.
    pub data_file: PathBuf,
    pub shutter_labels: [String; SHUTTER_COUNT],
    /// Digits shown after the decimal point on channel fields.
    pub decimals: usize,
    /// RF share applied by horizontal/vertical compensation moves.
    pub compensation_ratio: f64,
}
impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            shutter_labels: ["399", "Protection", "935", "355"].map(String::from),
            decimals: 4,
            compensation_ratio: 1.0,
        }
    }
}
impl PanelConfig {
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
    /// Settings from `path`, or defaults when it is missing or unusable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("no panel config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err:#}; using default panel config");
                Self::default()
            }
        }
    }
    pub fn store(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
