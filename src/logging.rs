//! Logging
//!
//! Installs the process-wide `tracing` subscriber. Settings come from the
//! `[logging]` section of [`ScreenshotrConfig`](crate::config::ScreenshotrConfig)
//! and can be overridden per process through `SCREENSHOTR_LOG`,
//! `SCREENSHOTR_LOG_FORMAT` and `SCREENSHOTR_LOG_OUTPUT`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "SCREENSHOTR_LOG";
const ENV_FORMAT: &str = "SCREENSHOTR_LOG_FORMAT";
const ENV_OUTPUT: &str = "SCREENSHOTR_LOG_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "Invalid log format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            other => Err(ConfigError::Invalid(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
                other
            ))),
        }
    }
}

/// `[logging]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level directive: trace, debug, info, warn, error or off
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Destination when `output = "file"`, appended to
    pub file: PathBuf,
    /// ANSI colors for text on a terminal stream
    pub color: bool,
    /// Per-target overrides, e.g. `"screenshotr::filter" = "debug"`
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stdout,
            file: PathBuf::from("screenshotr.log"),
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Apply the `SCREENSHOTR_LOG_FORMAT` / `SCREENSHOTR_LOG_OUTPUT` overrides
    fn with_env_overrides(&self) -> Result<Self, ConfigError> {
        let mut resolved = self.clone();
        if let Ok(format) = std::env::var(ENV_FORMAT) {
            resolved.format = format.parse()?;
        }
        if let Ok(output) = std::env::var(ENV_OUTPUT) {
            resolved.output = output.parse()?;
        }
        Ok(resolved)
    }

    /// Level filter: `SCREENSHOTR_LOG` wins, else `level` plus `modules`
    fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
            return Ok(filter);
        }

        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| ConfigError::Invalid(format!("Invalid log level {:?}: {}", self.level, e)))?;
        if self.level == "off" {
            return Ok(filter);
        }
        for (target, level) in &self.modules {
            let directive = format!("{}={}", target, level)
                .parse::<Directive>()
                .map_err(|e| ConfigError::Invalid(format!("Invalid log directive for {}: {}", target, e)))?;
            filter = filter.add_directive(directive);
        }
        Ok(filter)
    }

    fn open_file(&self) -> Result<File, ConfigError> {
        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Invalid(format!("Cannot create log directory {:?}: {}", parent, e)))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(|e| ConfigError::Invalid(format!("Cannot open log file {:?}: {}", self.file, e)))
    }
}

/// Install the global subscriber
///
/// `None` uses [`LoggingConfig::default`]. Fails if the settings are invalid
/// or a subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ConfigError> {
    let config = config.cloned().unwrap_or_default().with_env_overrides()?;
    let filter = config.env_filter()?;
    let ansi = config.color && config.output != LogOutput::File;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339());
    let registry = Registry::default().with(filter);

    let installed = match (config.format, config.output) {
        (LogFormat::Json, LogOutput::File) => registry.with(layer.json().with_writer(config.open_file()?)).try_init(),
        (LogFormat::Json, LogOutput::Stderr) => registry.with(layer.json().with_writer(std::io::stderr)).try_init(),
        (LogFormat::Json, LogOutput::Stdout) => registry.with(layer.json().with_writer(std::io::stdout)).try_init(),
        (LogFormat::Text, LogOutput::File) => registry
            .with(layer.with_ansi(false).with_writer(config.open_file()?))
            .try_init(),
        (LogFormat::Text, LogOutput::Stderr) => registry
            .with(layer.with_ansi(ansi).with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Text, LogOutput::Stdout) => registry
            .with(layer.with_ansi(ansi).with_writer(std::io::stdout))
            .try_init(),
    };

    installed.map_err(|e| ConfigError::Invalid(format!("Logger already installed: {}", e)))
}
