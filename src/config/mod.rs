//! Configuration management for Veles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::TransportConfig;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target server.
    #[serde(default)]
    pub target: TargetConfig,

    /// Operator identity sent in the login and submission exchanges.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Session behavior.
    #[serde(default)]
    pub session: SessionConfig,

    /// Transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("failed to write config: {e}")))?;

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.target.host.is_empty() {
            return Err(Error::Config("target host is empty".into()));
        }

        if self.identity.user.is_empty() {
            return Err(Error::Config("identity.user is not set".into()));
        }

        if self.session.checksum_retries == 0 {
            return Err(Error::Config(
                "session.checksum_retries must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Get default config path.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("net", "veles", "veles").map_or_else(
            || PathBuf::from("veles.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }

    /// Create example configuration.
    pub fn example() -> Self {
        Self {
            identity: IdentityConfig {
                user: "operator@example.com".into(),
                password: "hunter2".into(),
                name: "Example Operator".into(),
                email: "operator@example.com".into(),
                repo: "https://example.com/operator/submission".into(),
            },
            ..Default::default()
        }
    }
}

/// Target server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Server hostname.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    crate::DEFAULT_HOST.into()
}
fn default_port() -> u16 {
    crate::DEFAULT_PORT
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Operator identity configuration.
///
/// `user` and `password` fill the login request; `name`, `email`, and `repo`
/// fill the submission request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub repo: String,
}

/// Session behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How many frames to read at one protocol step before giving up on a
    /// response with a valid checksum.
    #[serde(default = "default_checksum_retries")]
    pub checksum_retries: u32,
}

fn default_checksum_retries() -> u32 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            checksum_retries: default_checksum_retries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable colored output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_color() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: default_color(),
        }
    }
}

/// Initialize logging.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Config(format!("failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(fmt::layer().with_ansi(config.color))
            .try_init()
            .map_err(|e| Error::Config(format!("failed to init logging: {e}")))?;
    }

    Ok(())
}
