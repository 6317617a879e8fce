//! Configuration for Flockr.
//!
//! Loaded once at startup and never mutated during a run.
//!
//! Search order:
//! 1. Explicit path if provided
//! 2. .flockr.yml in current directory (project config)
//! 3. ~/.config/flockr/flockr.yml (user config)
//! 4. Default values
//!
//! Validation is fatal: a config that would produce zero-duration sleeps
//! or an unreachable target refuses to run instead of behaving silently
//! wrong.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scheduler::SchedulerConfig;

/// Immutable run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Posting cycles to complete per day
    #[serde(rename = "daily-target")]
    pub daily_target: u32,

    /// Base short-pacing delay between posts, seconds
    #[serde(rename = "short-sleep-secs")]
    pub short_sleep_secs: u64,

    /// Half-width of the short-pacing jitter, seconds
    #[serde(rename = "short-sleep-noise-secs")]
    pub short_sleep_noise_secs: u64,

    /// Half-width of the long-pacing jitter, seconds
    #[serde(rename = "long-sleep-noise-secs")]
    pub long_sleep_noise_secs: u64,

    /// Seconds before a failed account is re-checked
    #[serde(rename = "liveness-cooldown-secs")]
    pub liveness_cooldown_secs: u64,

    /// Fallback sleep when no account is eligible, seconds
    #[serde(rename = "empty-fleet-retry-secs")]
    pub empty_fleet_retry_secs: u64,

    /// Fixed cooldown after a failed cycle, seconds
    #[serde(rename = "cycle-error-cooldown-secs")]
    pub cycle_error_cooldown_secs: u64,

    /// Path to the account roster JSON
    #[serde(rename = "accounts-path")]
    pub accounts_path: PathBuf,

    /// Path to the content candidate JSON
    #[serde(rename = "content-path")]
    pub content_path: PathBuf,

    /// Path to the SQLite health store; defaults next to the logs
    #[serde(rename = "store-path")]
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_target: 24,
            short_sleep_secs: 90,
            short_sleep_noise_secs: 30,
            long_sleep_noise_secs: 120,
            liveness_cooldown_secs: 60 * 60 * 24,
            empty_fleet_retry_secs: 300,
            cycle_error_cooldown_secs: 60,
            accounts_path: PathBuf::from("accounts.json"),
            content_path: PathBuf::from("content.json"),
            store_path: None,
        }
    }
}

impl Config {
    /// Load configuration with the fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".flockr.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .flockr.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .flockr.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("flockr").join("flockr.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration. Fatal at startup on failure.
    pub fn validate(&self) -> Result<()> {
        if self.daily_target == 0 {
            eyre::bail!("daily-target must be > 0");
        }
        if self.short_sleep_secs == 0 {
            eyre::bail!("short-sleep-secs must be > 0; zero-duration sleeps defeat pacing");
        }
        if self.short_sleep_noise_secs >= self.short_sleep_secs {
            eyre::bail!(
                "short-sleep-noise-secs ({}) must be smaller than short-sleep-secs ({}); \
                 the jitter lower bound would reach zero",
                self.short_sleep_noise_secs,
                self.short_sleep_secs
            );
        }
        if self.liveness_cooldown_secs == 0 {
            log::warn!("liveness-cooldown-secs is 0: failed accounts are retried every cycle");
        }
        Ok(())
    }

    /// Resolved health store path.
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flockr")
                .join("health.db")
        })
    }

    /// The scheduler's runtime knobs, derived once at startup.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            daily_target: self.daily_target,
            short_sleep_secs: self.short_sleep_secs,
            short_sleep_noise_secs: self.short_sleep_noise_secs,
            long_sleep_noise_secs: self.long_sleep_noise_secs,
            liveness_cooldown: chrono::Duration::seconds(self.liveness_cooldown_secs as i64),
            empty_fleet_retry: Duration::from_secs(self.empty_fleet_retry_secs),
            cycle_error_cooldown: Duration::from_secs(self.cycle_error_cooldown_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.daily_target, 24);
        assert_eq!(config.liveness_cooldown_secs, 86400);
    }

    #[test]
    fn test_validate_rejects_zero_target() {
        let config = Config {
            daily_target: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_short_sleep() {
        let config = Config {
            short_sleep_secs: 0,
            short_sleep_noise_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_noise_reaching_zero_bound() {
        let config = Config {
            short_sleep_secs: 30,
            short_sleep_noise_secs: 30,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("short-sleep-noise-secs"));
    }

    #[test]
    fn test_zero_cooldown_is_allowed() {
        let config = Config {
            liveness_cooldown_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("flockr.yml");
        std::fs::write(
            &path,
            "daily-target: 5\nshort-sleep-secs: 45\nshort-sleep-noise-secs: 10\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.daily_target, 5);
        assert_eq!(config.short_sleep_secs, 45);
        // untouched fields keep defaults
        assert_eq!(config.empty_fleet_retry_secs, 300);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/flockr.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_scheduler_config_conversion() {
        let config = Config::default();
        let sched = config.scheduler_config();
        assert_eq!(sched.daily_target, 24);
        assert_eq!(sched.liveness_cooldown, chrono::Duration::hours(24));
        assert_eq!(sched.cycle_error_cooldown, Duration::from_secs(60));
    }

    #[test]
    fn test_store_path_override() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/custom.db")),
            ..Config::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/tmp/custom.db"));
    }
}
