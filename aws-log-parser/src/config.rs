//! Parser configuration types
//!
//! This module defines the small set of knobs the parser library exposes.
//! Everything is serde-friendly so applications can embed it in their own
//! configuration files.

use crate::coerce::CoerceOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LogParserError;

/// What the record stream does when a line fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Yield the error, then end the stream
    #[default]
    Raise,
    /// Drop failing lines and record them in the stream's report
    #[serde(alias = "skip")]
    SkipAndReport,
    /// Yield errors inline with records and keep going
    Collect,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Raise => write!(f, "raise"),
            ErrorPolicy::SkipAndReport => write!(f, "skip_and_report"),
            ErrorPolicy::Collect => write!(f, "collect"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = LogParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "raise" => Ok(ErrorPolicy::Raise),
            "skip" | "skip_and_report" => Ok(ErrorPolicy::SkipAndReport),
            "collect" => Ok(ErrorPolicy::Collect),
            _ => Err(LogParserError::Config(format!("Unknown error policy: {}", s))),
        }
    }
}

/// Configuration for the parser library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Error handling policy for record streams
    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Accept unknown enumerated codes as plain strings
    #[serde(default)]
    pub enum_passthrough: bool,

    /// Skip `#`-prefixed header lines (CloudFront `#Version:` / `#Fields:`)
    #[serde(default = "default_true")]
    pub skip_comments: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::default(),
            enum_passthrough: false,
            skip_comments: true,
        }
    }
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Builder method: accept unknown enumerated codes
    pub fn with_enum_passthrough(mut self, enabled: bool) -> Self {
        self.enum_passthrough = enabled;
        self
    }

    /// Builder method: enable or disable skipping of `#` lines
    pub fn with_skip_comments(mut self, enabled: bool) -> Self {
        self.skip_comments = enabled;
        self
    }

    /// Options handed to the field coercers
    pub fn coerce_options(&self) -> CoerceOptions {
        CoerceOptions {
            enum_passthrough: self.enum_passthrough,
        }
    }
}
