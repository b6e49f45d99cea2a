//! Rendering parsed records

use aws_log_parser::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::net::IpAddr;

/// How records are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block of `name  value` rows per record
    #[default]
    Table,
    /// One JSON object per line
    Json,
    /// Re-encoded in the original log format
    Line,
}

/// Write records in the requested format
pub fn write_records<'a, W, I>(out: &mut W, records: I, format: OutputFormat) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    for (index, record) in records.into_iter().enumerate() {
        match format {
            OutputFormat::Table => write_table(out, index, record)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
            OutputFormat::Line => writeln!(out, "{}", record.to_line())?,
        }
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, index: usize, record: &Record) -> io::Result<()> {
    let width = record.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    writeln!(out, "── {} #{} ──", record.log_type(), index + 1)?;
    for (name, value) in record.iter() {
        writeln!(out, "  {:<width$}  {}", name, value, width = width)?;
    }
    writeln!(out)
}

/// Count records per client IP, ordered by address
pub fn count_hosts<'a, I>(records: I) -> BTreeMap<IpAddr, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts = BTreeMap::new();
    for record in records {
        match record.client_ip() {
            Some(ip) => *counts.entry(ip).or_insert(0) += 1,
            None => log::debug!("Record without client address skipped"),
        }
    }
    counts
}

pub fn write_hosts<W: Write>(out: &mut W, counts: &BTreeMap<IpAddr, usize>) -> io::Result<()> {
    for (ip, count) in counts {
        writeln!(out, "{}: {}", ip, count)?;
    }
    Ok(())
}
