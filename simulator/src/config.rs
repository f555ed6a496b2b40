use rosistrat_types::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::Level;

/// Configuration for the simulator host.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,

    /// Where saved simulations are kept; in memory only when absent.
    #[serde(default)]
    pub history_path: Option<String>,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Longest sequence a single request may ask for.
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// Values used for anything a request leaves out.
    #[serde(default)]
    pub defaults: SimulationConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: usize },
    #[error("invalid simulation defaults")]
    InvalidDefaults(#[source] rosistrat_types::Error),
    #[error("default sequence length {value} exceeds max_sequence_length {max}")]
    DefaultTooLong { value: usize, max: usize },
}

/// Host configuration after validation.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub port: u16,
    pub log_level: Level,
    pub json_logs: bool,
    pub history_path: Option<PathBuf>,
    pub history_limit: usize,
    pub max_sequence_length: usize,
    pub defaults: SimulationConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_max_sequence_length() -> usize {
    100_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            json_logs: false,
            history_path: None,
            history_limit: default_history_limit(),
            max_sequence_length: default_max_sequence_length(),
            defaults: SimulationConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "history_limit",
                value: self.history_limit,
            });
        }
        if self.max_sequence_length == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "max_sequence_length",
                value: self.max_sequence_length,
            });
        }
        self.defaults
            .validate()
            .map_err(ConfigError::InvalidDefaults)?;
        if self.defaults.sequence_length > self.max_sequence_length {
            return Err(ConfigError::DefaultTooLong {
                value: self.defaults.sequence_length,
                max: self.max_sequence_length,
            });
        }

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            port: self.port,
            log_level,
            json_logs: self.json_logs,
            history_path: self.history_path.map(PathBuf::from),
            history_limit: self.history_limit,
            max_sequence_length: self.max_sequence_length,
            defaults: self.defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosistrat_types::StrategyId;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("{}").unwrap().validate().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.history_path.is_none());
        assert_eq!(config.defaults, SimulationConfig::default());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
port: 9000
log_level: debug
json_logs: true
history_path: /tmp/rosistrat-history.json
defaults:
  strategy: sam_plus
  sequenceLength: 1000
  kellyFraction: 0.25
  streaks:
    enabled: false
"#;
        let config = Config::parse(yaml).unwrap().validate().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.json_logs);
        assert_eq!(
            config.history_path,
            Some(PathBuf::from("/tmp/rosistrat-history.json"))
        );
        assert_eq!(config.defaults.strategy, StrategyId::SamPlus);
        assert_eq!(config.defaults.sequence_length, 1000);
        assert_eq!(config.defaults.kelly_fraction, 0.25);
        assert!(!config.defaults.streaks.enabled);
        assert_eq!(config.defaults.streaks.variance_amplifier, 1.2);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config::parse("log_level: loud").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));

        let config = Config::parse("history_limit: 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero { field: "history_limit", .. })
        ));

        let config = Config::parse("defaults:\n  safetyRatio: -1").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDefaults(_))
        ));

        let config = Config::parse("max_sequence_length: 10").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DefaultTooLong { value: 500, max: 10 })
        ));

        assert!(matches!(
            Config::parse("port: [1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }
}
