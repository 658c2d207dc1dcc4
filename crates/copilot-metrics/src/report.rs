//! Plain-text summary of an [`AggregatedReport`].

use std::fmt::Write;

use metrics_core::formatting::{format_count, format_currency, format_delta, format_number, format_percent};
use metrics_data::aggregator::AggregatedReport;

const TOP_LANGUAGES: usize = 5;
const TOP_MODELS: usize = 5;

pub fn render_summary(
    report: &AggregatedReport,
    skipped_lines: usize,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, report, skipped_lines)?;
    Ok(out)
}

fn write_summary(
    out: &mut String,
    report: &AggregatedReport,
    skipped_lines: usize,
) -> std::fmt::Result {
    let stats = &report.stats;

    writeln!(out, "Copilot usage report")?;
    if !stats.report_start_day.is_empty() || !stats.report_end_day.is_empty() {
        writeln!(out, "Period: {} to {}", stats.report_start_day, stats.report_end_day)?;
    }
    writeln!(out, "Records: {}", format_count(stats.total_records as u64))?;
    if skipped_lines > 0 {
        writeln!(out, "Malformed lines skipped: {}", format_count(skipped_lines as u64))?;
    }
    writeln!(out)?;

    writeln!(out, "Users")?;
    writeln!(out, "  unique           {:>8}", format_count(stats.unique_users as u64))?;
    writeln!(out, "  chat             {:>8}", format_count(stats.chat_users as u64))?;
    writeln!(out, "  agent            {:>8}", format_count(stats.agent_users as u64))?;
    writeln!(out, "  completion only  {:>8}", format_count(stats.completion_only_users as u64))?;
    writeln!(
        out,
        "  top language     {} ({} engagements)",
        stats.top_language.name,
        format_count(stats.top_language.engagements)
    )?;
    writeln!(
        out,
        "  top IDE          {} ({} users)",
        stats.top_ide.name,
        format_count(stats.top_ide.entries as u64)
    )?;
    writeln!(
        out,
        "  top model        {} ({} engagements)",
        stats.top_model.name,
        format_count(stats.top_model.engagements)
    )?;

    if let Some(last) = report.engagement_data.last() {
        let avg = report
            .engagement_data
            .iter()
            .map(|r| r.engagement_percentage)
            .sum::<f64>()
            / report.engagement_data.len() as f64;
        writeln!(
            out,
            "  daily engagement {} avg, {} on {}",
            format_percent(avg, 1),
            format_percent(last.engagement_percentage, 1),
            last.date
        )?;
    }
    writeln!(out)?;

    let adoption = &report.feature_adoption_data;
    writeln!(out, "Feature adoption ({} users)", format_count(adoption.total_users as u64))?;
    for (label, users) in [
        ("completion", adoption.completion_users),
        ("chat", adoption.chat_users),
        ("agent mode", adoption.agent_mode_users),
        ("ask mode", adoption.ask_mode_users),
        ("edit mode", adoption.edit_mode_users),
        ("inline", adoption.inline_mode_users),
        ("code review", adoption.code_review_users),
    ] {
        writeln!(out, "  {:<15}{:>8}", label, format_count(users as u64))?;
    }
    writeln!(out)?;

    if !report.language_stats.is_empty() {
        writeln!(out, "Top languages")?;
        for lang in report.language_stats.iter().take(TOP_LANGUAGES) {
            writeln!(
                out,
                "  {:<20}{:>10} engagements {:>6} users {:>10} LOC",
                lang.language,
                format_count(lang.total_engagements),
                format_count(lang.unique_users as u64),
                format_delta(lang.loc_added as i64 - lang.loc_deleted as i64)
            )?;
        }
        writeln!(out)?;
    }

    if !report.ide_stats.is_empty() {
        writeln!(out, "IDEs")?;
        for ide in &report.ide_stats {
            let plugin = ide
                .latest_plugin_version
                .as_ref()
                .map(|p| format!(" [{} {}]", p.plugin, p.plugin_version))
                .unwrap_or_default();
            writeln!(
                out,
                "  {:<20}{:>6} users {:>10} engagements {:>8} accepted{}",
                ide.ide,
                format_count(ide.unique_users as u64),
                format_count(ide.total_engagements),
                format_percent(ide.acceptance_rate, 1),
                plugin
            )?;
        }
        writeln!(out)?;
    }

    let total_prus: f64 = report.pru_analysis_data.iter().map(|d| d.total_prus).sum();
    let pru_requests: u64 = report.pru_analysis_data.iter().map(|d| d.pru_requests).sum();
    let standard_requests: u64 = report
        .pru_analysis_data
        .iter()
        .map(|d| d.standard_requests)
        .sum();
    let value: f64 = report.pru_analysis_data.iter().map(|d| d.service_value).sum();
    writeln!(out, "Premium requests")?;
    writeln!(out, "  premium requests  {:>10}", format_count(pru_requests))?;
    writeln!(out, "  standard requests {:>10}", format_count(standard_requests))?;
    writeln!(out, "  PRUs              {:>10}", format_number(total_prus, 2))?;
    writeln!(out, "  service value     {:>10}", format_currency(value))?;
    for model in report.model_feature_distribution_data.iter().take(TOP_MODELS) {
        writeln!(
            out,
            "  {:<28}{:>8} requests {:>10} PRUs",
            model.model_display_name,
            format_count(model.total_interactions),
            format_number(model.total_prus, 2)
        )?;
    }
    writeln!(out)?;

    let joined_added: u64 = report.joined_impact_data.iter().map(|r| r.loc_added).sum();
    let joined_net: i64 = report.joined_impact_data.iter().map(|r| r.net_change).sum();
    writeln!(
        out,
        "Code impact: {} lines added, {} net",
        format_count(joined_added),
        format_delta(joined_net)
    )?;

    if !report.data_quality_issues.is_empty() {
        writeln!(
            out,
            "Data quality: {} agent users without agent-mode totals",
            format_count(report.data_quality_issues.len() as u64)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::models::MetricRecord;
    use metrics_data::aggregator::{aggregate_metrics, AggregateOptions};
    use metrics_data::reader::parse_metrics_str;

    const SAMPLE: &str = r#"
{"report_start_day":"2025-07-07","report_end_day":"2025-08-03","day":"2025-08-01","user_id":1,"user_login":"octocat","user_initiated_interaction_count":4,"used_chat":true,"used_agent":true,"totals_by_ide":[{"ide":"vscode","code_generation_activity_count":10,"code_acceptance_activity_count":4}],"totals_by_language_feature":[{"language":"rust","feature":"code_completion","code_generation_activity_count":10,"code_acceptance_activity_count":4,"loc_added_sum":20}],"totals_by_feature":[{"feature":"chat_panel_agent_mode","user_initiated_interaction_count":4,"loc_added_sum":30,"loc_deleted_sum":5}],"totals_by_model_feature":[{"model":"claude-sonnet-4","feature":"chat_panel_agent_mode","user_initiated_interaction_count":4}]}
{"report_start_day":"2025-07-07","report_end_day":"2025-08-03","day":"2025-08-02","user_id":2,"user_login":"mona","used_agent":true,"totals_by_feature":[{"feature":"code_completion","code_generation_activity_count":3,"loc_added_sum":6}]}
"#;

    fn sample_report() -> AggregatedReport {
        let parsed = parse_metrics_str(SAMPLE);
        let records: Vec<MetricRecord> = parsed.records;
        aggregate_metrics(&records, &AggregateOptions::default())
    }

    #[test]
    fn test_summary_contains_headline_figures() {
        let text = render_summary(&sample_report(), 0).expect("render");

        assert!(text.contains("Period: 2025-07-07 to 2025-08-03"));
        assert!(text.contains("top language     rust (14 engagements)"));
        assert!(text.contains("top IDE          vscode (1 users)"));
        assert!(text.contains("Claude Sonnet 4"));
        assert!(text.contains("$0.16"));
        assert!(text.contains("Data quality: 1 agent users"));
        assert!(!text.contains("Malformed lines"));
    }

    #[test]
    fn test_summary_reports_skipped_lines() {
        let text = render_summary(&sample_report(), 3).expect("render");
        assert!(text.contains("Malformed lines skipped: 3"));
    }

    #[test]
    fn test_summary_of_empty_report() {
        let records: Vec<MetricRecord> = Vec::new();
        let report = aggregate_metrics(&records, &AggregateOptions::default());
        let text = render_summary(&report, 0).expect("render");

        assert!(text.contains("top language     N/A (0 engagements)"));
        assert!(!text.contains("Top languages"));
        assert!(!text.contains("Period:"));
    }
}
