use crate::error::PaletteError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory name under the platform config and data dirs
pub const APP_DIR: &str = "toolkit-palette";

const CONFIG_FILE: &str = "config.json";
const RECENT_FILE: &str = "recent.json";

/// Runtime settings. Every field has a default so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Capacity of the recency list
    pub max_recent: usize,
    /// How long a smart-action confirmation stays visible
    pub feedback_dwell_ms: u64,
    /// Endpoint answering `{"ip": "..."}`
    pub ip_lookup_url: String,
    pub http_timeout_secs: u64,
    /// Keep the recency list across CLI invocations
    pub persist_recent: bool,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_recent: 10,
            feedback_dwell_ms: 900,
            ip_lookup_url: "https://api.ipify.org?format=json".to_string(),
            http_timeout_secs: 5,
            persist_recent: true,
        }
    }
}

impl PaletteConfig {
    pub fn feedback_dwell(&self) -> Duration {
        Duration::from_millis(self.feedback_dwell_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Default config location: `<config_dir>/toolkit-palette/config.json`
pub fn get_config_path() -> Result<PathBuf, PaletteError> {
    let base = dirs::config_dir().ok_or(PaletteError::NoConfigDir)?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Default recency store location: `<data_dir>/toolkit-palette/recent.json`
pub fn get_recent_path() -> Result<PathBuf, PaletteError> {
    let base = dirs::data_dir().ok_or(PaletteError::NoDataDir)?;
    Ok(base.join(APP_DIR).join(RECENT_FILE))
}

/// Load the config, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<PaletteConfig, PaletteError> {
    if !path.exists() {
        debug!("No config at {:?}, using defaults", path);
        return Ok(PaletteConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| PaletteError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: PaletteConfig =
        serde_json::from_str(&content).map_err(|e| PaletteError::ConfigParse(e.to_string()))?;

    debug!("Loaded config from {:?}", path);
    Ok(config)
}
