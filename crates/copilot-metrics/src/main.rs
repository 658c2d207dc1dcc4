mod bootstrap;
mod report;

use anyhow::{Context, Result};
use metrics_core::model_catalog::ModelCatalog;
use metrics_core::settings::{OutputFormat, Settings};
use metrics_data::aggregator::{aggregate_metrics, AggregateOptions};
use metrics_data::reader::load_metrics;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("copilot-metrics v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, filter: {}, format: {:?}",
        settings.input.display(),
        settings.date_filter,
        settings.format
    );

    let parsed = load_metrics(&settings.input)
        .with_context(|| format!("Failed to load metrics from {}", settings.input.display()))?;
    if parsed.skipped_lines > 0 {
        tracing::warn!("Skipped {} malformed lines", parsed.skipped_lines);
    }

    // Anchor relative filters on the export's own period unless overridden.
    let report_end_day = settings.report_end_day.clone().or_else(|| {
        parsed
            .records
            .first()
            .map(|r| r.report_end_day.clone())
            .filter(|d| !d.is_empty())
    });

    let options = AggregateOptions {
        remove_unknown_languages: settings.remove_unknown_languages,
        date_filter: settings.date_filter,
        report_end_day,
        catalog: ModelCatalog::default(),
    };
    let report = aggregate_metrics(&parsed.records, &options);

    match settings.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Summary => {
            print!("{}", report::render_summary(&report, parsed.skipped_lines)?)
        }
    }

    Ok(())
}
