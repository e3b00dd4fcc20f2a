/// Run configuration for the pipeline, loaded from a TOML file.
///
/// Every key is optional; a missing file yields the defaults, so the binary
/// runs out of the box with `data/` next to the working directory. A present
/// but malformed file is a fatal error — silently falling back to defaults
/// would hide typos in retention or throttling settings.

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::LogLevel;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON stores.
    pub data_dir: PathBuf,
    /// Optional website export directory; export is skipped when unset.
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Rolling retention window of the raw store, in days ending yesterday.
    pub retention_days: u32,
    /// Days of history requested from the forecast endpoint (provider cap: 92).
    pub past_days: u32,
    /// Days of forecast requested beyond today.
    pub forecast_days: u32,
    /// Timezone the provider aligns daily aggregates to.
    pub timezone: String,
    pub request_timeout_secs: u64,
    /// Pause before the single retry of a failed point fetch.
    pub retry_backoff_secs: u64,
    /// Pause between point fetches, to stay inside provider rate limits.
    pub throttle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level: "debug", "info", "warn" or "error".
    pub level: String,
    /// Optional log file, appended to in addition to console output.
    pub file: Option<String>,
    /// Include timestamps in console output (daemon-style logs).
    pub timestamps: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { data_dir: PathBuf::from("data"), export_dir: None }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            retention_days: 90,
            past_days: 90,
            forecast_days: 1,
            timezone: "Europe/Berlin".to_string(),
            request_timeout_secs: 60,
            retry_backoff_secs: 2,
            throttle_ms: 200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string(), file: None, timestamps: false }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads configuration from `path`, or the defaults if the file does not
    /// exist. Unreadable or malformed TOML is fatal.
    pub fn load(path: &Path) -> Result<Config, Box<dyn Error>> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }
}

impl StorageConfig {
    pub fn region_points_path(&self) -> PathBuf {
        self.data_dir.join("region_points.json")
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join("daily_region_raw.json")
    }

    pub fn region_days_path(&self) -> PathBuf {
        self.data_dir.join("regions_daily.json")
    }

    pub fn alerts_path(&self) -> PathBuf {
        self.data_dir.join("alerts.json")
    }

    pub fn status_path(&self) -> PathBuf {
        self.data_dir.join("pipeline_status.json")
    }
}

impl LoggingConfig {
    /// The configured minimum level; unknown names fall back to Info.
    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_name(&self.level).unwrap_or(LogLevel::Info)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
