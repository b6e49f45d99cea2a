//! Configuration loading and parsing

use anyhow::{Context, Result};
use aws_log_parser::{LogType, ParserConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::output::OutputFormat;

/// Main application configuration (loaded from config.toml)
///
/// Every value is a default that the matching command-line flag overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Log type name, e.g. "CloudFront" or "alb"
    pub log_type: Option<String>,
    /// Only files ending in this suffix (optionally followed by `.gz`) are read from directories
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    /// Only files whose path matches this regex are read from directories
    pub regex_filter: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            log_type: None,
            file_suffix: default_file_suffix(),
            regex_filter: None,
        }
    }
}

fn default_file_suffix() -> String {
    ".log".to_string()
}

impl InputConfig {
    /// The configured log type, if any
    pub fn log_type(&self) -> Result<Option<LogType>> {
        self.log_type
            .as_deref()
            .map(|name| name.parse::<LogType>())
            .transpose()
            .context("Invalid input.log_type in config file")
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub limit: Option<usize>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // Surface a bad log type at load time rather than on first use
    config.input.log_type()?;

    Ok(config)
}
