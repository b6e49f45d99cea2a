//! Main parser API
//!
//! This module provides the primary interface for the parser library.
//! A [`LogParser`] is bound to one declared log type and turns lines, readers
//! or files into a lazy stream of records.

use crate::builder::RecordBuilder;
use crate::config::{ErrorPolicy, ParserConfig};
use crate::error::{ParseError, ParseErrorKind};
use crate::schema::{registry, Schema};
use crate::tokenizer::tokenize;
use crate::types::{LogType, Record, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

/// Skipped errors kept verbatim in a [`ParseReport`]; later ones are only counted
pub const MAX_REPORTED_ERRORS: usize = 100;

/// The parser - entry point for all parsing operations
#[derive(Debug, Clone)]
pub struct LogParser {
    schema: &'static Schema,
    config: ParserConfig,
}

impl LogParser {
    /// Create a parser for the given log type with default settings
    pub fn new(log_type: LogType) -> Self {
        log::debug!("Using {} schema", log_type);
        Self {
            schema: registry(log_type),
            config: ParserConfig::default(),
        }
    }

    /// Builder method: replace the configuration
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn log_type(&self) -> LogType {
        self.schema.log_type
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a single line into a record
    ///
    /// # Example
    /// ```
    /// use aws_log_parser::{LogParser, LogType, Value};
    ///
    /// let parser = LogParser::new(LogType::CloudFront);
    /// let line = "2019-12-04\t21:02:31\tLAX1\t392\t192.0.2.1\tGET\td111111abcdef8.cloudfront.net\t/index.html\t200\t-\tMozilla/5.0";
    /// let record = parser.parse_line(line).unwrap();
    /// assert_eq!(record.get("bytes"), Some(&Value::Int(392)));
    /// assert!(record.get("referer").unwrap().is_absent());
    /// ```
    pub fn parse_line(&self, line: &str) -> std::result::Result<Record, ParseError> {
        self.parse_numbered(line, None)
    }

    fn parse_numbered(
        &self,
        line: &str,
        line_number: Option<usize>,
    ) -> std::result::Result<Record, ParseError> {
        tokenize(line, self.schema.delimiter)
            .map_err(ParseErrorKind::from)
            .and_then(|tokens| {
                RecordBuilder::build(&tokens, self.schema, &self.config.coerce_options())
            })
            .map_err(|kind| ParseError::new(line, line_number, kind))
    }

    /// Parse a sequence of lines lazily
    ///
    /// Records come out in input order. What happens on a malformed line is
    /// decided by the configured [`ErrorPolicy`].
    pub fn parse_log<'a, I, S>(&'a self, lines: I) -> Records<'a>
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(|line| Ok::<String, io::Error>(line.into()));
        Records::new(self, Box::new(lines))
    }

    /// Parse every line of a buffered reader lazily
    pub fn parse_reader<'a, R>(&'a self, reader: R) -> Records<'a>
    where
        R: BufRead + 'a,
    {
        Records::new(self, Box::new(reader.lines()))
    }

    /// Open a plain-text log file and parse it lazily
    pub fn parse_file(&self, path: &Path) -> Result<Records<'_>> {
        log::info!("Parsing {} log file: {:?}", self.log_type(), path);
        let file = File::open(path)?;
        Ok(self.parse_reader(BufReader::new(file)))
    }
}

/// Summary of a record stream, most useful with [`ErrorPolicy::SkipAndReport`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Log entry lines seen (headers and blank lines excluded)
    pub lines: usize,
    /// Lines that produced a record
    pub records: usize,
    /// Lines that failed to parse
    pub failed: usize,
    /// The first [`MAX_REPORTED_ERRORS`] errors that were skipped
    pub skipped: Vec<ParseError>,
}

/// Lazy iterator of parsed records
///
/// Single-use over the line source it wraps. I/O errors from the source are
/// always yielded and end the stream.
pub struct Records<'a> {
    parser: &'a LogParser,
    lines: Box<dyn Iterator<Item = io::Result<String>> + 'a>,
    line_number: usize,
    report: ParseReport,
    finished: bool,
}

impl<'a> Records<'a> {
    fn new(parser: &'a LogParser, lines: Box<dyn Iterator<Item = io::Result<String>> + 'a>) -> Self {
        Self {
            parser,
            lines,
            line_number: 0,
            report: ParseReport::default(),
            finished: false,
        }
    }

    /// Counters and skipped errors so far
    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    /// Consume the stream's remaining items and return the final report
    pub fn into_report(mut self) -> ParseReport {
        for _ in self.by_ref() {}
        self.report
    }

    fn is_entry(&self, line: &str) -> bool {
        let trimmed = line.trim();
        !(trimmed.is_empty() || (self.parser.config.skip_comments && trimmed.starts_with('#')))
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };
            self.line_number += 1;

            if !self.is_entry(&line) {
                log::debug!("Skipping non-entry line {}", self.line_number);
                continue;
            }
            self.report.lines += 1;

            match self.parser.parse_numbered(&line, Some(self.line_number)) {
                Ok(record) => {
                    self.report.records += 1;
                    return Some(Ok(record));
                }
                Err(error) => {
                    self.report.failed += 1;
                    match self.parser.config.on_error {
                        ErrorPolicy::Raise => {
                            self.finished = true;
                            return Some(Err(error.into()));
                        }
                        ErrorPolicy::Collect => return Some(Err(error.into())),
                        ErrorPolicy::SkipAndReport => {
                            log::warn!("Skipping malformed {} line: {}", self.parser.log_type(), error);
                            if self.report.skipped.len() < MAX_REPORTED_ERRORS {
                                self.report.skipped.push(error);
                            }
                        }
                    }
                }
            }
        }
    }
}

impl FusedIterator for Records<'_> {}
