use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::date_filter::DateRangeFilter;
use crate::error::Result;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// How the aggregated report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable headline figures.
    #[default]
    Summary,
    /// The full report as pretty-printed JSON.
    Json,
}

/// Aggregate Copilot usage-metrics exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "copilot-metrics",
    about = "Aggregate Copilot usage-metrics exports into engagement, adoption and premium-usage reports",
    version
)]
pub struct Settings {
    /// JSONL export file, or a directory searched recursively for *.jsonl / *.json
    pub input: PathBuf,

    /// Restrict the report to the trailing window ending on the report's last day
    #[arg(long, value_enum, default_value_t = DateRangeFilter::All)]
    pub date_filter: DateRangeFilter,

    /// Last day of the report (YYYY-MM-DD); defaults to the export's own report_end_day
    #[arg(long)]
    pub report_end_day: Option<String>,

    /// Drop "unknown" and blank languages from language statistics
    /// (`--remove-unknown-languages=false` overrides a saved `true`)
    #[arg(
        long,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false
    )]
    pub remove_unknown_languages: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.copilot-metrics/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<DateRangeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_unknown_languages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".copilot-metrics").join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments, fill unset options from the last run and
    /// persist the merged result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(std::env::args_os().collect(), &LastUsedParams::config_path())
    }

    /// Same as [`load_with_last_used`](Self::load_with_last_used) with an
    /// explicit argument list and config location.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // clap keys arg ids by field name (underscores), not the long flag.
        if !is_arg_explicitly_set(&matches, "date_filter") {
            if let Some(v) = last.date_filter {
                settings.date_filter = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "remove_unknown_languages") {
            if let Some(v) = last.remove_unknown_languages {
                settings.remove_unknown_languages = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!("Failed to persist settings to {}: {}", config_path.display(), e);
        }

        settings.apply_debug()
    }

    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            date_filter: Some(s.date_filter),
            remove_unknown_languages: Some(s.remove_unknown_languages),
            format: Some(s.format),
        }
    }
}

/// `true` when `name` came from the command line rather than a default.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
