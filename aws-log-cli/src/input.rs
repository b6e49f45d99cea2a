//! Log file discovery and opening
//!
//! Paths named on the command line are read as-is. Directories are walked
//! recursively and filtered by file suffix and an optional regex, mirroring
//! how AWS delivers many small log objects under one prefix.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const GZIP_EXTENSION: &str = ".gz";
const FILE_SCHEME: &str = "file://";

/// Turn a command-line location into a local path
///
/// Plain paths and `file://` URLs are accepted. Other URL schemes are refused
/// since only local files are read.
pub fn parse_location(raw: &str) -> std::result::Result<PathBuf, String> {
    if let Some(path) = raw.strip_prefix(FILE_SCHEME) {
        if path.is_empty() {
            return Err(format!("No path in {}", raw));
        }
        return Ok(PathBuf::from(path));
    }
    match raw.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Err(format!("Unsupported location {}: only local paths and file:// URLs are read", raw))
        }
        _ => Ok(PathBuf::from(raw)),
    }
}

/// Which files inside a directory are log files
#[derive(Debug, Clone)]
pub struct FileFilter {
    suffix: String,
    pattern: Option<Regex>,
}

impl FileFilter {
    pub fn new(suffix: &str, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Regex::new(p).with_context(|| format!("Invalid file filter regex: {}", p)))
            .transpose()?;
        Ok(Self {
            suffix: suffix.to_string(),
            pattern,
        })
    }

    /// Whether a path found while walking a directory should be parsed
    pub fn matches(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        let stem = name.strip_suffix(GZIP_EXTENSION).unwrap_or(name);
        let suffix_ok = name.ends_with(&self.suffix) || stem.ends_with(&self.suffix);

        suffix_ok
            && self
                .pattern
                .as_ref()
                .map_or(true, |re| re.is_match(&path.to_string_lossy()))
    }
}

/// Expand the given paths into a sorted list of log files
pub fn collect_files(paths: &[PathBuf], filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let metadata =
            fs::metadata(path).with_context(|| format!("Failed to access {:?}", path))?;
        if metadata.is_dir() {
            let before = files.len();
            walk_dir(path, filter, &mut files)?;
            log::debug!("Found {} log file(s) under {:?}", files.len() - before, path);
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(dir: &Path, filter: &FileFilter, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, filter, files)?;
        } else if filter.matches(&path) {
            files.push(path);
        } else {
            log::trace!("Ignoring {:?}", path);
        }
    }
    Ok(())
}

/// Open a log file, transparently decompressing `.gz` objects
pub fn open(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).with_context(|| format!("Failed to open log file: {:?}", path))?;

    let is_gzip = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.ends_with(GZIP_EXTENSION));

    if is_gzip {
        log::debug!("Decompressing {:?}", path);
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
