//! Configuration for the log linter.
//!
//! Layered configuration:
//! - Default values
//! - TOML configuration file (`loglint.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LOGLINT_` and use double
//! underscores to separate nested levels:
//! - `LOGLINT_WATCH__POLL_TIMEOUT_MS=250` sets `watch.poll_timeout_ms`
//! - `LOGLINT_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::LintError;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "loglint.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Whitelist patterns; `*` matches exactly one character
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Directory for intercepted log files (defaults to the user's local
    /// data dir, falling back to the system temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Bound on how long the poll loop blocks before re-checking shutdown
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_poll_timeout_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            whitelist: Vec::new(),
            log_dir: None,
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `loglint.toml`, then `LOGLINT_` env.
    pub fn load() -> Result<Self, LintError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load settings with an explicit config file path.
    pub fn load_from(config_path: &Path) -> Result<Self, LintError> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("LOGLINT_").split("__"))
            .extract()
            .map_err(|e| LintError::Config {
                reason: e.to_string(),
            })
    }

    /// Write a commented starter configuration file.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn init_config_file(path: &Path, force: bool) -> Result<(), LintError> {
        if path.exists() && !force {
            return Err(LintError::Config {
                reason: format!("{} already exists (use --force to overwrite)", path.display()),
            });
        }

        let contents = r#"# loglint configuration
version = 1

# Allow-list for appended log lines. Patterns are fixed-length: `*`
# matches exactly one character, everything else is literal.
whitelist = [
    # "OK: *",
]

# Directory for intercepted log files. Defaults to the user data dir.
# log_dir = "/tmp/loglint"

[watch]
# Poll loop timeout in milliseconds (shutdown latency bound).
poll_timeout_ms = 500

[logging]
default = "warn"

# [logging.modules]
# watcher = "debug"
"#;

        std::fs::write(path, contents)?;
        Ok(())
    }
}
