//! JSONL discovery and loading for usage-metrics exports.
//!
//! Each non-blank line holds one [`MetricRecord`]. Lines that fail to parse
//! are logged and counted; they never abort a load.

use std::path::{Path, PathBuf};

use metrics_core::error::{MetricsError, Result};
use metrics_core::models::MetricRecord;
use tracing::{debug, warn};

/// Records parsed from one or more exports, plus the number of lines dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedMetrics {
    pub records: Vec<MetricRecord>,
    pub skipped_lines: usize,
}

impl ParsedMetrics {
    fn extend(&mut self, other: ParsedMetrics) {
        self.records.extend(other.records);
        self.skipped_lines += other.skipped_lines;
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.jsonl` / `.json` files recursively under `data_path`, sorted by
/// path.
pub fn find_metrics_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "jsonl" || ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Parse newline-delimited records from an in-memory export.
pub fn parse_metrics_str(content: &str) -> ParsedMetrics {
    let mut parsed = ParsedMetrics::default();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<MetricRecord>(trimmed) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!("Skipping malformed line {}: {}", idx + 1, e);
                parsed.skipped_lines += 1;
            }
        }
    }

    parsed
}

/// Load records from a single export file or from every export under a
/// directory.
///
/// Files are read in path order so the record stream, and therefore every
/// "first seen" tie-break downstream, is reproducible.
pub fn load_metrics(path: &Path) -> Result<ParsedMetrics> {
    if !path.exists() {
        return Err(MetricsError::DataPathNotFound(path.to_path_buf()));
    }

    if path.is_file() {
        return read_metrics_file(path);
    }

    let files = find_metrics_files(path);
    if files.is_empty() {
        return Err(MetricsError::NoDataFiles(path.to_path_buf()));
    }

    let mut all = ParsedMetrics::default();
    for file_path in &files {
        match read_metrics_file(file_path) {
            Ok(parsed) => all.extend(parsed),
            Err(e) => warn!("{}", e),
        }
    }

    debug!(
        "Loaded {} records from {} files ({} lines skipped)",
        all.records.len(),
        files.len(),
        all.skipped_lines
    );

    Ok(all)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_metrics_file(path: &Path) -> Result<ParsedMetrics> {
    let content = std::fs::read_to_string(path).map_err(|source| MetricsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_metrics_str(&content);
    debug!(
        "File {}: {} records, {} skipped",
        path.display(),
        parsed.records.len(),
        parsed.skipped_lines
    );
    Ok(parsed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
