// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the bandix monitor
//!
//! Values are layered: command-line flags (or their environment variables)
//! override the `[bandix]` table of the TOML config file, which overrides
//! the built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::collector::CollectOptions;
use crate::error::{AppError, Result};


/// Default configuration values
pub mod defaults {
    pub const URL: &str = "http://10.0.0.1/ubus";
    pub const USERNAME: &str = "root";
    pub const PASSWORD: &str = "password";
    pub const CONFIG_FILE: &str = "bandix_config.toml";
    pub const TIMEOUT_SECS: u64 = 5;
    pub const CONCURRENCY: usize = 1;
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const URL: &str = "BANDIX_URL";
    pub const USERNAME: &str = "BANDIX_USERNAME";
    pub const PASSWORD: &str = "BANDIX_PASSWORD";
}

/// Output rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "bandix-monitor", version)]
#[command(about = "OpenWrt bandix traffic monitor")]
pub struct Cli {
    /// Router ubus URL
    #[arg(long, env = env_vars::URL)]
    pub url: Option<String>,

    /// Login username
    #[arg(short, long, env = env_vars::USERNAME)]
    pub username: Option<String>,

    /// Login password
    #[arg(short, long, env = env_vars::PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Config file path
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug output (raw requests and responses)
    #[arg(short, long)]
    pub debug: bool,

    /// Output format (default: from config file, else table)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum concurrent device metric requests
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Contents of the `[bandix]` table of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub format: Option<OutputFormat>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    bandix: FileConfig,
}

impl FileConfig {
    /// Parses a config document; a document without `[bandix]` is empty
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the TOML is invalid.
    pub fn parse(text: &str) -> Result<Self> {
        let document: ConfigDocument = toml::from_str(text)
            .map_err(|e| AppError::Config(format!("invalid config file: {e}")))?;
        Ok(document.bandix)
    }

    /// Reads the config file at `path`; a missing file yields an empty config
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!("Loaded config file {}", path.display());
                Self::parse(&text)
                    .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Resolved application configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub url: String,
    pub username: String,
    pub password: String,
    pub format: OutputFormat,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub debug: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("format", &self.format)
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: defaults::URL.to_string(),
            username: defaults::USERNAME.to_string(),
            password: defaults::PASSWORD.to_string(),
            format: OutputFormat::default(),
            timeout_secs: defaults::TIMEOUT_SECS,
            concurrency: defaults::CONCURRENCY,
            debug: false,
        }
    }
}

/// Treats empty strings as unset
fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl Config {
    /// Loads the config file named by `cli` and applies the flags on top
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file is invalid or the result fails validation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = FileConfig::load(&cli.config)?;
        Self::merge(cli, file)
    }

    /// Layers `cli` over `file` over defaults and validates the result
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the merged configuration is invalid.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let defaults = Config::default();
        let config = Config {
            url: non_empty(cli.url.as_ref())
                .or(file.url)
                .unwrap_or(defaults.url),
            username: non_empty(cli.username.as_ref())
                .or(file.username)
                .unwrap_or(defaults.username),
            password: non_empty(cli.password.as_ref())
                .or(file.password)
                .unwrap_or(defaults.password),
            format: cli.format.or(file.format).unwrap_or(defaults.format),
            timeout_secs: cli
                .timeout
                .or(file.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
            concurrency: cli
                .concurrency
                .or(file.concurrency)
                .unwrap_or(defaults.concurrency),
            debug: cli.debug,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Config(
                "username and password cannot be empty; set them in the config file or pass --username/--password".to_string(),
            ));
        }

        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Invalid URL '{}': expected http:// or https://",
                self.url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout must be at least 1 second".to_string()));
        }

        if self.concurrency == 0 {
            return Err(AppError::Config("concurrency must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Connection settings for the collector
    #[must_use]
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            concurrency: self.concurrency,
        }
    }
}
