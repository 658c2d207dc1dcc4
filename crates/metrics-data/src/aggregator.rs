//! Single-pass aggregation of usage-metrics records into every report series.
//!
//! Each record is visited once and its fragments dispatched to the
//! per-domain accumulators in [`crate::calculators`]; each accumulator is then
//! finalised exactly once.

use metrics_core::date_filter::{DateRange, DateRangeFilter};
use metrics_core::model_catalog::ModelCatalog;
use metrics_core::models::MetricRecord;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calculators::chat::{ChatAccumulator, DailyChatRequests, DailyChatUsers};
use crate::calculators::data_quality::{DataQualityAccumulator, DataQualityIssue};
use crate::calculators::engagement::{DailyEngagement, EngagementAccumulator};
use crate::calculators::feature_adoption::{FeatureAdoption, FeatureAdoptionAccumulator};
use crate::calculators::ide::{IdeAccumulator, IdeStats};
use crate::calculators::impact::{FeatureImpact, ImpactAccumulator, ImpactRow, ImpactSeries};
use crate::calculators::language::{should_filter_language, LanguageAccumulator, LanguageStats};
use crate::calculators::model_usage::{
    AgentModeHeatmap, DailyModelUsage, DailyPruAnalysis, ModelFeatureDistribution,
    ModelUsageAccumulator,
};
use crate::calculators::stats::{MetricsStats, StatsAccumulator};
use crate::calculators::users::{UserSummary, UserSummaryAccumulator};

// ── Options ───────────────────────────────────────────────────────────────────

/// Knobs for one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Drop `unknown` and blank languages from language statistics.
    pub remove_unknown_languages: bool,
    /// Relative window, resolved against `report_end_day`.
    pub date_filter: DateRangeFilter,
    /// `YYYY-MM-DD` anchor for `date_filter`; without it nothing is filtered.
    pub report_end_day: Option<String>,
    pub catalog: ModelCatalog,
}

impl AggregateOptions {
    /// Absolute window for this run, or `None` when every record is kept.
    pub fn resolve_date_range(&self) -> Option<DateRange> {
        let end_day = self.report_end_day.as_deref()?;
        match self.date_filter.resolve_str(end_day) {
            Ok(range) => range,
            Err(e) => {
                warn!("Ignoring {} filter: {}", self.date_filter, e);
                None
            }
        }
    }
}

// ── AggregatedReport ──────────────────────────────────────────────────────────

/// Every derived series for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    pub stats: MetricsStats,
    pub user_summaries: Vec<UserSummary>,
    pub engagement_data: Vec<DailyEngagement>,
    pub chat_users_data: Vec<DailyChatUsers>,
    pub chat_requests_data: Vec<DailyChatRequests>,
    pub language_stats: Vec<LanguageStats>,
    pub ide_stats: Vec<IdeStats>,
    pub model_usage_data: Vec<DailyModelUsage>,
    pub feature_adoption_data: FeatureAdoption,
    pub pru_analysis_data: Vec<DailyPruAnalysis>,
    pub agent_mode_heatmap_data: Vec<AgentModeHeatmap>,
    pub model_feature_distribution_data: Vec<ModelFeatureDistribution>,
    pub agent_impact_data: Vec<ImpactRow>,
    pub code_completion_impact_data: Vec<ImpactRow>,
    pub edit_mode_impact_data: Vec<ImpactRow>,
    pub inline_mode_impact_data: Vec<ImpactRow>,
    pub ask_mode_impact_data: Vec<ImpactRow>,
    pub joined_impact_data: Vec<ImpactRow>,
    pub data_quality_issues: Vec<DataQualityIssue>,
}

// ── aggregate_metrics ─────────────────────────────────────────────────────────

/// Aggregate `records` in a single pass.
///
/// Never fails: malformed input has already been dropped by the reader, and
/// an empty stream yields zeroed stats and empty series.
pub fn aggregate_metrics<'a, I>(records: I, options: &AggregateOptions) -> AggregatedReport
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    let range = options.resolve_date_range();
    if let Some(r) = range {
        debug!("Restricting report to {} ..= {}", r.start, r.end);
    }

    let mut stats = StatsAccumulator::new();
    let mut users = UserSummaryAccumulator::new();
    let mut engagement = EngagementAccumulator::new();
    let mut chat = ChatAccumulator::new();
    let mut languages = LanguageAccumulator::new();
    let mut ides = IdeAccumulator::new();
    let mut model_usage = ModelUsageAccumulator::new(&options.catalog);
    let mut adoption = FeatureAdoptionAccumulator::new();
    let mut impact = ImpactAccumulator::new();
    let mut data_quality = DataQualityAccumulator::new();

    let mut total_records = 0usize;
    let mut skipped_by_filter = 0usize;

    for record in records {
        if let Some(r) = range {
            if !r.contains(record.day) {
                skipped_by_filter += 1;
                continue;
            }
        }
        total_records += 1;

        let date = record.day;
        let user_id = record.user_id;

        stats.set_report_period(&record.report_start_day, &record.report_end_day);
        stats.accumulate_user_usage(user_id, record.used_chat, record.used_agent);
        users.accumulate(record);
        engagement.accumulate(date, user_id);
        impact.ensure_date(date);
        data_quality.accumulate(record);

        for ide in &record.totals_by_ide {
            stats.accumulate_ide_user(&ide.ide, user_id);
            ides.accumulate(user_id, ide);
        }

        for lang in &record.totals_by_language_feature {
            if should_filter_language(&lang.language, options.remove_unknown_languages) {
                continue;
            }
            stats.accumulate_language_engagement(
                &lang.language,
                lang.code_generation_activity_count + lang.code_acceptance_activity_count,
            );
            languages.accumulate(user_id, lang);
        }

        for mf in &record.totals_by_model_feature {
            stats.accumulate_model_engagement(
                &mf.model,
                mf.code_generation_activity_count + mf.code_acceptance_activity_count,
            );
            model_usage.accumulate_model_feature(
                date,
                &mf.model,
                &mf.feature,
                mf.user_initiated_interaction_count,
            );
        }

        let mut impacts = Vec::with_capacity(record.totals_by_feature.len());
        for feature in &record.totals_by_feature {
            adoption.accumulate(
                user_id,
                &feature.feature,
                feature.user_initiated_interaction_count,
                feature.code_generation_activity_count,
            );
            chat.accumulate_feature(
                date,
                user_id,
                &feature.feature,
                feature.user_initiated_interaction_count,
            );
            model_usage.accumulate_agent_heatmap_from_feature(
                date,
                user_id,
                &feature.feature,
                feature.user_initiated_interaction_count,
            );
            impacts.push(FeatureImpact {
                feature: &feature.feature,
                loc_added: feature.loc_added_sum,
                loc_deleted: feature.loc_deleted_sum,
            });
        }
        impact.accumulate_feature_impacts(date, user_id, &impacts);
    }

    debug!(
        "Aggregated {} records ({} outside the date window)",
        total_records, skipped_by_filter
    );

    AggregatedReport {
        stats: stats.compute(total_records),
        user_summaries: users.compute(),
        engagement_data: engagement.compute(),
        chat_users_data: chat.compute_users(),
        chat_requests_data: chat.compute_requests(),
        language_stats: languages.compute(),
        ide_stats: ides.compute(),
        model_usage_data: model_usage.compute_model_usage_data(),
        feature_adoption_data: adoption.compute(),
        pru_analysis_data: model_usage.compute_pru_analysis_data(),
        agent_mode_heatmap_data: model_usage.compute_agent_mode_heatmap_data(),
        model_feature_distribution_data: model_usage.compute_model_feature_distribution_data(),
        agent_impact_data: impact.compute(ImpactSeries::Agent),
        code_completion_impact_data: impact.compute(ImpactSeries::CodeCompletion),
        edit_mode_impact_data: impact.compute(ImpactSeries::EditMode),
        inline_mode_impact_data: impact.compute(ImpactSeries::InlineMode),
        ask_mode_impact_data: impact.compute(ImpactSeries::AskMode),
        joined_impact_data: impact.compute(ImpactSeries::Joined),
        data_quality_issues: data_quality.compute(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
