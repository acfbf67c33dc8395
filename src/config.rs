//! Logging configuration.
//!
//! Options come from three layers, each field resolved on its own:
//!
//! 1. built-in defaults
//! 2. host-level settings ([`LogOptions::from_env`] or [`LogOptions::from_json`])
//! 3. call-site overrides passed by the code that installs the logger
//!
//! A later layer wins wherever it sets a field.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use crate::classify::{ClassifyOptions, DEFAULT_ASSET_MARKER};
use crate::error::Error;

/// One layer of logging options. `None` means "not set at this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LogOptions {
    /// Write records to a file instead of stdout.
    pub use_file_logging: Option<bool>,
    /// Classify requests by headers and URL before logging them.
    pub perform_header_checks: Option<bool>,
    /// Directory of the log file. Created if missing.
    pub log_path: Option<PathBuf>,
    /// File name inside `log_path`.
    pub log_name: Option<String>,
    /// `EnvFilter` directive, e.g. `info` or `ssr_log=debug`.
    pub level: Option<String>,
    /// URL substring marking internal assets.
    pub asset_marker: Option<String>,
}

impl LogOptions {
    /// Reads host-level settings from `SSR_LOG_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            use_file_logging: env_bool("SSR_LOG_FILE")?,
            perform_header_checks: env_bool("SSR_LOG_HEADER_CHECKS")?,
            log_path: env_var("SSR_LOG_PATH").map(PathBuf::from),
            log_name: env_var("SSR_LOG_NAME"),
            level: env_var("SSR_LOG_LEVEL"),
            asset_marker: env_var("SSR_LOG_ASSET_MARKER"),
        })
    }

    /// Parses host-level settings from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Config(format!("log options: {e}")))
    }

    /// Layers `over` on top of `self`.
    pub fn merge(self, over: LogOptions) -> LogOptions {
        LogOptions {
            use_file_logging: over.use_file_logging.or(self.use_file_logging),
            perform_header_checks: over.perform_header_checks.or(self.perform_header_checks),
            log_path: over.log_path.or(self.log_path),
            log_name: over.log_name.or(self.log_name),
            level: over.level.or(self.level),
            asset_marker: over.asset_marker.or(self.asset_marker),
        }
    }
}

/// Fully resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub use_file_logging: bool,
    pub perform_header_checks: bool,
    pub log_path: PathBuf,
    pub log_name: String,
    pub level: String,
    pub asset_marker: String,
}

impl LogConfig {
    /// Applies defaults, then `host`, then `call_site`.
    pub fn resolve(host: LogOptions, call_site: LogOptions) -> Self {
        let opts = host.merge(call_site);
        let defaults = Self::default();
        Self {
            use_file_logging: opts.use_file_logging.unwrap_or(defaults.use_file_logging),
            perform_header_checks: opts.perform_header_checks.unwrap_or(defaults.perform_header_checks),
            log_path: opts.log_path.unwrap_or(defaults.log_path),
            log_name: opts.log_name.unwrap_or(defaults.log_name),
            level: opts.level.unwrap_or(defaults.level),
            asset_marker: opts.asset_marker.unwrap_or(defaults.asset_marker),
        }
    }

    /// Full path of the log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_path.join(&self.log_name)
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            perform_header_checks: self.perform_header_checks,
            asset_marker: self.asset_marker.clone(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let app_env = env_var("APP_ENV").unwrap_or_else(|| "development".to_owned());
        Self {
            use_file_logging: true,
            perform_header_checks: true,
            log_path: PathBuf::from("./logs"),
            log_name: format!("{app_env}.log"),
            level: "info".to_owned(),
            asset_marker: DEFAULT_ASSET_MARKER.to_owned(),
        }
    }
}

/// Non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(key: &str) -> Result<Option<bool>, Error> {
    let Some(raw) = env_var(key) else { return Ok(None) };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(Error::Config(format!("{key} must be a boolean, got `{raw}`"))),
    }
}
