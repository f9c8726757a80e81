//! Scheduler configuration loading from scheduler.toml
//!
//! Holds the tunables of the reminder and overdue scans plus the list of
//! currencies to seed on startup. Every field has a default, so a missing file
//! yields a working configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "scheduler.toml";

/// Configuration structure representing the entire scheduler.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on how far ahead the reminder scan looks, in days
    #[serde(default = "default_reminder_lookahead_days")]
    pub reminder_lookahead_days: i64,
    /// How far back an overdue schedule is still worth notifying about, in days
    #[serde(default = "default_overdue_window_days")]
    pub overdue_window_days: i64,
    /// Currencies to seed into the reference table
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
}

/// Configuration for a single seeded currency
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

const fn default_reminder_lookahead_days() -> i64 {
    30
}

const fn default_overdue_window_days() -> i64 {
    7
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reminder_lookahead_days: default_reminder_lookahead_days(),
            overdue_window_days: default_overdue_window_days(),
            currencies: Vec::new(),
        }
    }
}

impl SchedulerConfig {
    fn validate(self) -> Result<Self> {
        if self.reminder_lookahead_days < 0 {
            return Err(Error::Config {
                message: "reminder_lookahead_days must not be negative".to_string(),
            });
        }
        if self.overdue_window_days < 0 {
            return Err(Error::Config {
                message: "overdue_window_days must not be negative".to_string(),
            });
        }
        Ok(self)
    }
}

/// Parses scheduler configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<SchedulerConfig> {
    let config: SchedulerConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse scheduler config: {e}"),
    })?;
    config.validate()
}

/// Loads scheduler configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid, or a
/// window is negative.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SchedulerConfig> {
    debug!("Loading scheduler configuration from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `SCHEDULER_CONFIG` or `./scheduler.toml`.
///
/// A missing file is not an error; the defaults are used instead.
pub fn load_default_config() -> Result<SchedulerConfig> {
    let path =
        std::env::var("SCHEDULER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        info!("No scheduler config at {}, using defaults", path);
        Ok(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_scheduler_config() {
        let toml_str = r#"
            reminder_lookahead_days = 14
            overdue_window_days = 3

            [[currencies]]
            code = "JPY"
            name = "Japanese Yen"
            symbol = "¥"

            [[currencies]]
            code = "USD"
            name = "US Dollar"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.reminder_lookahead_days, 14);
        assert_eq!(config.overdue_window_days, 3);
        assert_eq!(config.currencies.len(), 2);
        assert_eq!(config.currencies[0].symbol, "¥");
        assert_eq!(config.currencies[1].symbol, "");
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.reminder_lookahead_days, 30);
        assert_eq!(config.overdue_window_days, 7);
        assert!(config.currencies.is_empty());
    }

    #[test]
    fn test_negative_window_rejected() {
        let result = parse_config("reminder_lookahead_days = -1");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = load_config("/nonexistent/scheduler.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
