//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [worker]
//! queue_capacity = 64
//! thread_name = "vizmap-worker"
//!
//! [suggest]
//! min_confidence = 0.8
//!
//! [logging]
//! log_data = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vizmap_engine::suggest::DEFAULT_MIN_CONFIDENCE;
use vizmap_worker::WorkerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub worker: WorkerConfig,
    pub suggest: SuggestConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub min_confidence: f32,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Allow specification text in trace logs.
    pub log_data: bool,
}

impl EngineConfig {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        anyhow::ensure!(
            (0.0..=1.0).contains(&config.suggest.min_confidence),
            "suggest.min_confidence must be within 0.0..=1.0, got {}",
            config.suggest.min_confidence
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(EngineConfig::parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = EngineConfig::parse(
            "[worker]\nqueue_capacity = 4\n\n[suggest]\nmin_confidence = 0.9\n\n[logging]\nlog_data = true\n",
        )
        .unwrap();
        assert_eq!(config.worker.queue_capacity, 4);
        assert_eq!(config.worker.thread_name, "vizmap-worker");
        assert!((config.suggest.min_confidence - 0.9).abs() < f32::EPSILON);
        assert!(config.logging.log_data);
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(EngineConfig::parse("[suggest]\nmin_confidence = 1.5\n").is_err());
    }
}
