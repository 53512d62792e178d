use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use thiserror::Error;

use crate::screening::{ScreeningError, TimeGrid};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub screening: ScreeningConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// TLE file, or folder of `.tle`/`.txt` files
    pub tle_source: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    #[serde(default = "default_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(default = "default_step", deserialize_with = "deserialize_duration")]
    pub step: Duration,
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
    /// Grid start; the current UTC minute when absent
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            step: default_step(),
            threshold_km: default_threshold_km(),
            start: None,
        }
    }
}

impl ScreeningConfig {
    /// Sample grid for this window, anchored at `start` or else at `now`
    /// truncated to the minute
    pub fn grid(&self, now: DateTime<Utc>) -> Result<TimeGrid, ScreeningError> {
        let start = match self.start {
            Some(start) => start,
            None => now.duration_trunc(Duration::minutes(1)).unwrap_or(now),
        };
        TimeGrid::new(start, self.duration, self.step)
    }
}

fn default_duration() -> Duration {
    Duration::hours(24)
}

fn default_step() -> Duration {
    Duration::minutes(10)
}

fn default_threshold_km() -> f64 {
    500.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Config pointing at a catalog with every other setting defaulted
    pub fn for_catalog(tle_source: PathBuf) -> Self {
        Self {
            catalog: CatalogConfig { tle_source },
            screening: ScreeningConfig::default(),
            web: WebConfig::default(),
        }
    }
}

/// Parse a human-readable duration such as "24h" or "10m"
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}
