//! AWS Log Parser CLI Application
//!
//! This is the command-line interface for the AWS access log parser.
//! It uses the aws-log-parser library and adds:
//! - Directory walking with suffix / regex filtering
//! - Transparent `.gz` decompression
//! - Parallel parsing of many log objects
//! - Table, JSON and raw-line output, and per-host request counts

use anyhow::{bail, Context, Result};
use aws_log_parser::{ErrorPolicy, LogParser, LogParserError, LogType, ParseReport, Record};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use rayon::prelude::*;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;
mod input;
mod output;

use config::AppConfig;
use input::FileFilter;
use output::OutputFormat;

/// AWS Log Parser - Parse CloudFront and Elastic Load Balancing access logs
#[derive(Parser, Debug)]
#[command(name = "aws-log-cli")]
#[command(about = "Parse AWS CloudFront and load balancer access logs", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml) with default settings
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse log files and print the records
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum number of records to print
        #[arg(short = 'n', long, value_name = "COUNT")]
        limit: Option<usize>,

        /// What to do with malformed lines (raise, skip, collect)
        #[arg(long, value_name = "POLICY")]
        on_error: Option<ErrorPolicy>,
    },
    /// Count requests per client IP
    Hosts {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Log files or directories to parse (plain paths or file:// URLs)
    #[arg(required = true, value_name = "PATH", value_parser = input::parse_location)]
    paths: Vec<PathBuf>,

    /// Log type (CloudFront, ClassicLoadBalancer, LoadBalancer, NetworkLoadBalancer)
    #[arg(short = 't', long)]
    log_type: Option<LogType>,

    /// File suffix to look for inside directories [default: .log]
    #[arg(long, value_name = "SUFFIX")]
    suffix: Option<String>,

    /// Only parse directory entries whose path matches this regex
    #[arg(long, value_name = "REGEX")]
    filter: Option<String>,
}

/// Everything parsed out of one log file
struct ParsedFile {
    path: PathBuf,
    records: Vec<Record>,
    errors: Vec<LogParserError>,
    report: ParseReport,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(log_level(args.verbose, args.quiet));

    log::info!("AWS Log Parser CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using parser library v{}", aws_log_parser::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    match args.command {
        Command::Parse {
            input,
            format,
            limit,
            on_error,
        } => {
            let mut app_config = app_config;
            if let Some(policy) = on_error {
                app_config.parser.on_error = policy;
            }
            let format = format.unwrap_or(app_config.output.format);
            let limit = limit.or(app_config.output.limit);
            parse_command(&input, &app_config, format, limit)
        }
        Command::Hosts { input } => hosts_command(&input, &app_config),
    }
}

/// Parse mode - print every record in the chosen format
fn parse_command(
    input: &InputArgs,
    config: &AppConfig,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let parsed = parse_inputs(input, config, limit)?;
    check_raise(&parsed, config.parser.on_error)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let records = parsed.iter().flat_map(|file| &file.records);
    output::write_records(&mut out, records.take(limit.unwrap_or(usize::MAX)), format)?;
    out.flush()?;

    finish(&parsed, config.parser.on_error)
}

/// Hosts mode - count requests per client address
fn hosts_command(input: &InputArgs, config: &AppConfig) -> Result<()> {
    let parsed = parse_inputs(input, config, None)?;
    check_raise(&parsed, config.parser.on_error)?;

    let counts = output::count_hosts(parsed.iter().flat_map(|file| &file.records));
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    output::write_hosts(&mut out, &counts)?;
    out.flush()?;

    finish(&parsed, config.parser.on_error)
}

/// Resolve the inputs and parse every file, several at a time
fn parse_inputs(input: &InputArgs, config: &AppConfig, limit: Option<usize>) -> Result<Vec<ParsedFile>> {
    let log_type = match input.log_type {
        Some(log_type) => log_type,
        None => config
            .input
            .log_type()?
            .context("No log type given: pass --log-type or set input.log_type in the config file")?,
    };

    let suffix = input.suffix.as_deref().unwrap_or(&config.input.file_suffix);
    let pattern = input.filter.as_deref().or(config.input.regex_filter.as_deref());
    let filter = FileFilter::new(suffix, pattern)?;

    let files = input::collect_files(&input.paths, &filter)?;
    if files.is_empty() {
        log::warn!("No log files matched under {:?}", input.paths);
    }
    log::info!("Parsing {} {} log file(s)", files.len(), log_type);

    let parser = LogParser::new(log_type).with_config(config.parser.clone());
    files
        .par_iter()
        .map(|path| parse_file(&parser, path, limit))
        .collect()
}

fn parse_file(parser: &LogParser, path: &Path, limit: Option<usize>) -> Result<ParsedFile> {
    let reader = input::open(path)?;
    let mut stream = parser.parse_reader(reader);

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for result in stream.by_ref() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
        if limit.map_or(false, |limit| records.len() >= limit) {
            break;
        }
    }

    let report = stream.report().clone();
    log::debug!("{:?}: {} record(s) from {} line(s)", path, report.records, report.lines);

    Ok(ParsedFile {
        path: path.to_path_buf(),
        records,
        errors,
        report,
    })
}

/// Under `Raise`, the first malformed line in any file aborts the run before
/// anything is printed
fn check_raise(parsed: &[ParsedFile], policy: ErrorPolicy) -> Result<()> {
    if policy != ErrorPolicy::Raise {
        return Ok(());
    }
    match parsed.iter().find_map(|file| file.errors.first().map(|e| (&file.path, e))) {
        Some((path, error)) => bail!("{:?}: {}", path, error),
        None => Ok(()),
    }
}

/// Report collected and skipped lines once output has been written
fn finish(parsed: &[ParsedFile], policy: ErrorPolicy) -> Result<()> {
    for file in parsed {
        if file.report.failed > 0 && policy == ErrorPolicy::SkipAndReport {
            log::warn!("{:?}: skipped {} malformed line(s)", file.path, file.report.failed);
        }
        for error in &file.errors {
            log::error!("{:?}: {}", file.path, error);
        }
    }

    let total: usize = parsed.iter().map(|file| file.records.len()).sum();
    log::info!("Parsed {} record(s) from {} file(s)", total, parsed.len());
    Ok(())
}

/// `-q` wins over `-v`; RUST_LOG can still override per module
fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
