//! Configuration loading traits and types.
//!
//! A fault pipeline is configured from a single TOML file:
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "orders-api"
//!
//! [host]
//! reporting = "ERROR | WARNING | USER_ERROR | USER_WARNING"
//! display_errors = false
//!
//! [dispatch]
//! throw_as_exception = false
//! error_page = "json"
//! ```
//!
//! Every section except `[shared]` may be omitted.
//!
//! # Usage
//!
//! ```rust,no_run
//! use fault_common::config::{ConfigError, ConfigLoader, FaultConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = FaultConfig::load(Path::new("faults.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Fields common to every process embedding the fault pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

/// Host-side settings: the initial live reporting mask and display behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Initial reportable mask. Can be changed at runtime.
    #[serde(default = "Severity::all")]
    pub reporting: Severity,

    /// Display faults by default. When false, dispatchers start silenced.
    #[serde(default = "default_true")]
    pub display_errors: bool,

    /// Process exit code used on fatal termination.
    #[serde(default = "default_exit_code")]
    pub exit_code: i32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            reporting: Severity::all(),
            display_errors: true,
            exit_code: default_exit_code(),
        }
    }
}

/// Which page renderer a silenced dispatcher uses for native faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPageKind {
    /// No page; silencing is a no-op.
    #[default]
    None,
    /// Plain text page.
    Plain,
    /// JSON document.
    Json,
}

/// Dispatcher policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Raise recoverable faults as errors instead of dispatching them.
    #[serde(default)]
    pub throw_as_exception: bool,

    /// Severities that terminate the process.
    #[serde(default = "default_fatal_mask")]
    pub fatal_mask: Severity,

    /// Explicit silencing. When absent, derived from `host.display_errors`.
    #[serde(default)]
    pub silence_all: Option<bool>,

    /// Renderer for silenced native faults.
    #[serde(default)]
    pub error_page: ErrorPageKind,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            throw_as_exception: false,
            fatal_mask: default_fatal_mask(),
            silence_all: None,
            error_page: ErrorPageKind::None,
        }
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl FaultConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `shared.service_name` is empty
    /// - `dispatch.fatal_mask` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shared.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        if self.dispatch.fatal_mask.is_empty() {
            return Err(ConfigError::ValidationError(
                "fatal_mask cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_exit_code() -> i32 {
    1
}

fn default_fatal_mask() -> Severity {
    Severity::FATAL_DEFAULT
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax or field types are invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
