//! Planpoker configuration types and loading

use eyre::{Context, Result};
use pokercore::{DEFAULT_OUTLIER_RATIO, OutlierPolicy, SessionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
const LOCAL_CONFIG: &str = ".planpoker.yml";

/// Main planpoker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Session rules and actor sizing
    pub session: SessionConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        let ratio = self.session.outlier_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(eyre::eyre!(
                "session.outlier-ratio must be a non-negative number, got {}",
                ratio
            ));
        }
        if self.session.command_buffer == 0 {
            return Err(eyre::eyre!("session.command-buffer must be greater than zero"));
        }
        if self.session.event_buffer == 0 {
            return Err(eyre::eyre!("session.event-buffer must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .planpoker.yml
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/planpoker/planpoker.yml
        if let Some(user_config) = user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is initialized
    ///
    /// Any failure yields `None`; the full load reports errors later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("planpoker").join("planpoker.yml"))
}

/// Session rules and actor sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Only the facilitator may create, reveal, reset, select and finalize
    #[serde(rename = "enforce-facilitator")]
    pub enforce_facilitator: bool,

    /// Allowed deviation from the average before a vote is flagged
    #[serde(rename = "outlier-ratio")]
    pub outlier_ratio: f64,

    /// Pending commands per session actor
    #[serde(rename = "command-buffer")]
    pub command_buffer: usize,

    /// Buffered change events per session before slow subscribers lag
    #[serde(rename = "event-buffer")]
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enforce_facilitator: true,
            outlier_ratio: DEFAULT_OUTLIER_RATIO,
            command_buffer: 64,
            event_buffer: 64,
        }
    }
}

impl SessionConfig {
    /// Rules handed to each new session
    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            enforce_facilitator: self.enforce_facilitator,
            outliers: OutlierPolicy::new(self.outlier_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.log_level.is_none());
        assert!(config.session.enforce_facilitator);
        assert_eq!(config.session.outlier_ratio, 0.5);
        assert_eq!(config.session.command_buffer, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
session:
  enforce-facilitator: false
  outlier-ratio: 0.25
  command-buffer: 8
  event-buffer: 16
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(!config.session.enforce_facilitator);
        assert_eq!(config.session.outlier_ratio, 0.25);
        assert_eq!(config.session.command_buffer, 8);
        assert_eq!(config.session.event_buffer, 16);

        let policy = config.session.policy();
        assert!(!policy.enforce_facilitator);
        assert_eq!(policy.outliers.ratio, 0.25);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
session:
  outlier-ratio: 1.0
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.session.outlier_ratio, 1.0);
        assert!(config.session.enforce_facilitator);
        assert_eq!(config.session.event_buffer, 64);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.outlier_ratio = -0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.outlier_ratio = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.command_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.event_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("planpoker.yml");
        std::fs::write(&path, "log-level: warn\nsession:\n  command-buffer: 4\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.session.command_buffer, 4);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_rejects_invalid() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("planpoker.yml");
        std::fs::write(&path, "session:\n  event-buffer: 0\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yml");

        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
