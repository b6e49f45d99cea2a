//! Error types for tokenizing, coercing and parsing log lines
//!
//! Every failure is addressable: tokenizer errors carry a column, coercion
//! errors carry the raw value and target type, and parse errors carry the
//! offending line plus the field that failed.

use thiserror::Error;

/// The line could not be split into fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated quote starting at column {column}")]
    UnterminatedQuote { column: usize },
}

/// A single raw field could not be converted to its target type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("invalid {expected}: {raw:?}")]
    Invalid { raw: String, expected: &'static str },

    #[error("unknown value {:?} (expected one of: {})", .raw, .allowed.join(", "))]
    UnknownEnumValue { raw: String, allowed: &'static [&'static str] },

    #[error("missing value in a required field")]
    Missing,
}

impl CoercionError {
    pub(crate) fn invalid(raw: &str, expected: &'static str) -> Self {
        CoercionError::Invalid {
            raw: raw.to_string(),
            expected,
        }
    }
}

/// What went wrong while turning a line into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("expected {expected} fields, found {found}")]
    FieldCountMismatch { expected: String, found: usize },

    #[error("field {index} ({field}): {source}")]
    Coercion {
        index: usize,
        field: &'static str,
        #[source]
        source: CoercionError,
    },
}

/// A line that failed to parse, with enough context to locate it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {}: {}", line_label(.line_number), .kind)]
pub struct ParseError {
    /// The raw line as read
    pub line: String,
    /// 1-based position in the input stream, when parsed from a stream
    pub line_number: Option<usize>,
    /// The underlying failure
    pub kind: ParseErrorKind,
}

fn line_label(line_number: &Option<usize>) -> String {
    match line_number {
        Some(n) => n.to_string(),
        None => "?".to_string(),
    }
}

impl ParseError {
    pub(crate) fn new(line: &str, line_number: Option<usize>, kind: ParseErrorKind) -> Self {
        Self {
            line: line.to_string(),
            line_number,
            kind,
        }
    }

    /// Name of the field that failed coercion, if that is what happened
    pub fn field(&self) -> Option<&'static str> {
        match &self.kind {
            ParseErrorKind::Coercion { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum LogParserError {
    #[error("Failed to parse log line: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogParserError {
    /// The parse error, if this is one
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            LogParserError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
