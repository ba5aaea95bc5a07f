//! Service configuration loaded from a TOML file.
//!
//! The path comes from `NETCHECK_CONFIG` and defaults to `./config.toml`.
//! Every key is optional; omitted keys take the defaults below.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use netcheck_toolbox::{LookupOptions, PortCheckConfig};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "NETCHECK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub port_check: PortCheckSettings,
    pub lookup: LookupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub workers: usize,
    /// Mounted in front of every route, e.g. `/api`. Empty for none.
    pub route_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            route_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
    /// Daily-rolling JSON log files are written here when set.
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortCheckSettings {
    pub default_timeout_secs: f64,
    pub max_timeout_secs: f64,
    pub resolve_timeout_secs: f64,
}

impl Default for PortCheckSettings {
    fn default() -> Self {
        Self {
            default_timeout_secs: 3.0,
            max_timeout_secs: 15.0,
            resolve_timeout_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub dkim_selectors: Vec<String>,
    pub http_timeout_secs: f64,
    /// Upper bound for a whole `/lookup` request.
    pub request_timeout_secs: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        let options = LookupOptions::default();
        Self {
            dkim_selectors: options.dkim_selectors,
            http_timeout_secs: options.http_timeout.as_secs_f64(),
            request_timeout_secs: 60,
        }
    }
}

/// Config path from `NETCHECK_CONFIG`, else `config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

impl AppConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.workers == 0 {
            return Err(invalid("server.workers", "must be at least 1"));
        }
        let prefix = &self.server.route_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(invalid(
                "server.route_prefix",
                "must be empty or start with '/' and not end with '/'",
            ));
        }

        let pc = &self.port_check;
        check_secs("port_check.default_timeout_secs", pc.default_timeout_secs)?;
        check_secs("port_check.max_timeout_secs", pc.max_timeout_secs)?;
        check_secs("port_check.resolve_timeout_secs", pc.resolve_timeout_secs)?;
        if pc.default_timeout_secs > pc.max_timeout_secs {
            return Err(invalid(
                "port_check.default_timeout_secs",
                "must not exceed port_check.max_timeout_secs",
            ));
        }

        if self.lookup.dkim_selectors.is_empty()
            || self.lookup.dkim_selectors.iter().any(|s| s.trim().is_empty())
        {
            return Err(invalid(
                "lookup.dkim_selectors",
                "must list at least one non-empty selector",
            ));
        }
        check_secs("lookup.http_timeout_secs", self.lookup.http_timeout_secs)?;
        if self.lookup.request_timeout_secs == 0 {
            return Err(invalid("lookup.request_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn port_check_config(&self) -> PortCheckConfig {
        let defaults = PortCheckConfig::default();
        PortCheckConfig {
            default_timeout: secs(self.port_check.default_timeout_secs, defaults.default_timeout),
            max_timeout: secs(self.port_check.max_timeout_secs, defaults.max_timeout),
        }
    }

    pub fn resolve_timeout(&self) -> Duration {
        secs(self.port_check.resolve_timeout_secs, Duration::from_secs(5))
    }

    pub fn lookup_options(&self) -> LookupOptions {
        let defaults = LookupOptions::default();
        LookupOptions {
            dkim_selectors: self.lookup.dkim_selectors.clone(),
            http_timeout: secs(self.lookup.http_timeout_secs, defaults.http_timeout),
        }
    }

    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup.request_timeout_secs)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn check_secs(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && Duration::try_from_secs_f64(value).is_ok() {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number of seconds"))
    }
}

fn secs(value: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(fallback)
}
