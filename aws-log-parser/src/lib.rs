//! AWS Access Log Parser Library
//!
//! A stateless, reusable library for turning AWS access log lines into typed
//! records. Supported log types:
//! - CloudFront standard logs (tab-delimited)
//! - Classic Load Balancer logs
//! - Application Load Balancer logs
//! - Network Load Balancer logs
//!
//! # Architecture
//!
//! Every line goes through the same pipeline:
//! - the tokenizer splits it according to the log type's delimiter rules
//! - the schema registry supplies the ordered field descriptors
//! - the record builder coerces each token into a typed [`Value`]
//!
//! The library does NOT:
//! - Fetch or decompress log objects
//! - Aggregate or query records
//!
//! Those live in the application layer (aws-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use aws_log_parser::{ErrorPolicy, LogParser, LogType, ParserConfig};
//! use std::path::Path;
//!
//! let config = ParserConfig::new().with_error_policy(ErrorPolicy::SkipAndReport);
//! let parser = LogParser::new(LogType::ApplicationLoadBalancer).with_config(config);
//!
//! let mut records = parser.parse_file(Path::new("alb.log")).unwrap();
//! for record in records.by_ref() {
//!     match record {
//!         Ok(record) => println!("{:?} {:?}", record.client_ip(), record.get("request")),
//!         Err(e) => eprintln!("Read error: {}", e),
//!     }
//! }
//! println!("skipped {} malformed lines", records.report().failed);
//! ```

// Public modules
pub mod builder;
pub mod coerce;
pub mod config;
pub mod encode;
pub mod error;
pub mod parser;
pub mod schema;
pub mod tokenizer;
pub mod types;

// Re-export main types for convenience
pub use builder::RecordBuilder;
pub use coerce::{CoerceOptions, Coercer};
pub use config::{ErrorPolicy, ParserConfig};
pub use encode::encode;
pub use error::{CoercionError, LogParserError, ParseError, ParseErrorKind, TokenizeError};
pub use parser::{LogParser, ParseReport, Records};
pub use schema::{registry, FieldDescriptor, Schema};
pub use tokenizer::{tokenize, Delimiter};
pub use types::{Field, HostPort, HttpRequest, LogType, Record, Result, Timestamp, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
