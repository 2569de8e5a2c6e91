use crate::notify::{LogChannel, LogLevel};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Accepted range for `watcher.poll_interval_seconds`
pub const POLL_INTERVAL_RANGE: RangeInclusive<u32> = 1..=100;

/// Accepted range for `watcher.countdown_seconds`
pub const COUNTDOWN_RANGE: RangeInclusive<u32> = 1..=18000;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShutdownConfig {
    pub watcher: WatcherConfig,
    pub notify: NotifyConfig,
    pub host: HostConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WatcherConfig {
    /// Seconds between two checks of the countdown
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u32,

    /// Seconds the server has to stay empty before it is shut down
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    /// Start a countdown as soon as the server has started
    #[serde(default = "default_shutdown_on_empty_at_startup")]
    pub shutdown_on_empty_at_startup: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotifyConfig {
    /// Most verbose notification level delivered to players and console
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Where notifications are delivered
    #[serde(default = "default_log_channel")]
    pub log_channel: LogChannel,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HostConfig {
    /// File the world snapshot is written to before shutting down
    #[serde(default = "default_save_path")]
    pub save_path: String,

    /// Capacity of the chat broadcast channel
    #[serde(default = "default_chat_capacity")]
    pub chat_capacity: usize,
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_seconds))
    }
}

impl ShutdownConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default(
                "watcher.poll_interval_seconds",
                default_poll_interval_seconds(),
            )?
            .set_default("watcher.countdown_seconds", default_countdown_seconds())?
            .set_default(
                "watcher.shutdown_on_empty_at_startup",
                default_shutdown_on_empty_at_startup(),
            )?
            .set_default("notify.log_level", default_log_level().as_str())?
            .set_default("notify.log_channel", default_log_channel().as_str())?
            .set_default("host.save_path", default_save_path())?
            .set_default("host.chat_capacity", default_chat_capacity() as i64)?
            .add_source(File::with_name(&path_str).required(false))
            // EMPTY_SHUTDOWN_WATCHER__COUNTDOWN_SECONDS=600
            .add_source(
                Environment::with_prefix("EMPTY_SHUTDOWN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ShutdownConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !POLL_INTERVAL_RANGE.contains(&self.watcher.poll_interval_seconds) {
            return Err(ConfigError::Message(format!(
                "watcher.poll_interval_seconds must be within {}..={}, got {}",
                POLL_INTERVAL_RANGE.start(),
                POLL_INTERVAL_RANGE.end(),
                self.watcher.poll_interval_seconds
            )));
        }

        if !COUNTDOWN_RANGE.contains(&self.watcher.countdown_seconds) {
            return Err(ConfigError::Message(format!(
                "watcher.countdown_seconds must be within {}..={}, got {}",
                COUNTDOWN_RANGE.start(),
                COUNTDOWN_RANGE.end(),
                self.watcher.countdown_seconds
            )));
        }

        if self.host.save_path.trim().is_empty() {
            return Err(ConfigError::Message(
                "host.save_path must not be empty".to_string(),
            ));
        }

        if self.host.chat_capacity == 0 {
            return Err(ConfigError::Message(
                "host.chat_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig::default(),
            notify: NotifyConfig::default(),
            host: HostConfig {
                save_path: default_save_path(),
                chat_capacity: default_chat_capacity(),
            },
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            countdown_seconds: default_countdown_seconds(),
            shutdown_on_empty_at_startup: default_shutdown_on_empty_at_startup(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_channel: default_log_channel(),
        }
    }
}

// Default value functions
fn default_poll_interval_seconds() -> u32 {
    1
}
fn default_countdown_seconds() -> u32 {
    300
}
fn default_shutdown_on_empty_at_startup() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::None
}
fn default_log_channel() -> LogChannel {
    LogChannel::All
}

fn default_save_path() -> String {
    "./world-snapshot.json".to_string()
}
fn default_chat_capacity() -> usize {
    64
}
