//! TOML configuration for timing defaults and default concurrency.
//!
//! ```toml
//! [poll]
//! interval_ms = 1000
//! immediately = false
//! immediate_delay_ms = 10
//!
//! [wait]
//! interval_ms = 1000
//! timeout_ms = 5000
//!
//! [batch]
//! concurrency = 0
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;
use timeable_core::poll::{DEFAULT_POLL_INTERVAL, IMMEDIATE_DELAY, PollOptions};
use timeable_core::wait::DEFAULT_WAIT_INTERVAL;
use timeable_utils::concurrency_from;

/// Overrides the default config location.
pub const CONFIG_ENV: &str = "TIMEABLE_CONFIG";

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Deserialize)]
pub struct TimeableConfig {
    pub poll: Option<PollSection>,
    pub wait: Option<WaitSection>,
    pub batch: Option<BatchSection>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PollSection {
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub immediately: bool,
    pub immediate_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WaitSection {
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// `concurrency` is read loosely: numbers, numeric strings and booleans all
/// work, and anything below 1 means unset.
#[derive(Debug, Default, Deserialize)]
pub struct BatchSection {
    pub concurrency: Option<serde_json::Value>,
}

impl TimeableConfig {
    /// Loads from `$TIMEABLE_CONFIG`, else `~/.timeable/config.toml`.
    /// Returns `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::from_path(&path).map(Some)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Failed to read config");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content).map_err(|err| {
            tracing::warn!(path = %path.display(), %err, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn poll_options(&self) -> PollOptions {
        let section = self.poll.as_ref();
        PollOptions {
            interval: section
                .and_then(|poll| poll.interval_ms)
                .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis),
            immediately: section.is_some_and(|poll| poll.immediately),
            immediate_delay: section
                .and_then(|poll| poll.immediate_delay_ms)
                .map_or(IMMEDIATE_DELAY, Duration::from_millis),
        }
    }

    #[must_use]
    pub fn wait_interval(&self) -> Duration {
        self.wait
            .as_ref()
            .and_then(|wait| wait.interval_ms)
            .map_or(DEFAULT_WAIT_INTERVAL, Duration::from_millis)
    }

    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        self.wait
            .as_ref()
            .and_then(|wait| wait.timeout_ms)
            .map_or(DEFAULT_WAIT_TIMEOUT, Duration::from_millis)
    }

    /// Default concurrency for the batch runners; 0 when unset.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.batch
            .as_ref()
            .and_then(|batch| batch.concurrency.as_ref())
            .map_or(0, concurrency_from)
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|path| !path.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".timeable").join("config.toml"))
}
