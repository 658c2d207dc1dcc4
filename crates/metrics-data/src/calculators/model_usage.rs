//! Model usage and premium request unit (PRU) accounting.
//!
//! Every `(model, feature)` total is priced through the [`ModelCatalog`]:
//! `prus = interactions * multiplier`. The same pass also feeds the agent-mode
//! heatmap and the per-model feature distribution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use metrics_core::calculations::{intensity_level, percentage, round2, service_value};
use metrics_core::model_catalog::{normalize_model_key, ModelCatalog, ModelClass};
use metrics_core::models::{features, UserId};
use serde::Serialize;

use super::InsertionMap;

// ── Output ────────────────────────────────────────────────────────────────────

/// Requests per model class for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyModelUsage {
    pub date: NaiveDate,
    pub pru_models: u64,
    pub standard_models: u64,
    pub unknown_models: u64,
    #[serde(rename = "totalPRUs")]
    pub total_prus: f64,
    pub service_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPruUsage {
    pub name: String,
    pub requests: u64,
    pub prus: f64,
    pub is_premium: bool,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPruAnalysis {
    pub date: NaiveDate,
    pub pru_requests: u64,
    /// Every request on a model that does not consume PRUs, unlisted models
    /// included.
    pub standard_requests: u64,
    pub pru_percentage: f64,
    #[serde(rename = "totalPRUs")]
    pub total_prus: f64,
    pub service_value: f64,
    pub top_model: String,
    #[serde(rename = "topModelPRUs")]
    pub top_model_prus: f64,
    pub top_model_is_premium: bool,
    pub models: Vec<ModelPruUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentModeHeatmap {
    pub date: NaiveDate,
    pub agent_mode_requests: u64,
    pub unique_users: usize,
    /// 0..=5, see [`intensity_level`].
    pub intensity: u8,
    pub service_value: f64,
}

/// Interactions on one model split by the feature that issued them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBreakdown {
    pub agent_mode: u64,
    pub ask_mode: u64,
    pub edit_mode: u64,
    pub inline_mode: u64,
    pub code_completion: u64,
    pub code_review: u64,
    pub other: u64,
}

impl FeatureBreakdown {
    fn add(&mut self, feature: &str, interactions: u64) {
        let slot = match feature {
            features::CHAT_PANEL_AGENT_MODE | features::AGENT_EDIT => &mut self.agent_mode,
            features::CHAT_PANEL_ASK_MODE => &mut self.ask_mode,
            features::CHAT_PANEL_EDIT_MODE => &mut self.edit_mode,
            features::CHAT_INLINE => &mut self.inline_mode,
            features::CODE_COMPLETION => &mut self.code_completion,
            features::CODE_REVIEW => &mut self.code_review,
            _ => &mut self.other,
        };
        *slot += interactions;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFeatureDistribution {
    pub model: String,
    pub model_display_name: String,
    pub multiplier: f64,
    pub features: FeatureBreakdown,
    pub total_interactions: u64,
    #[serde(rename = "totalPRUs")]
    pub total_prus: f64,
    pub service_value: f64,
}

// ── Accumulator state ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ModelTally {
    requests: u64,
    prus: f64,
    multiplier: f64,
    is_premium: bool,
}

#[derive(Debug, Default)]
struct ModelDay {
    premium_requests: u64,
    standard_requests: u64,
    unknown_requests: u64,
    prus: f64,
    models: InsertionMap<String, ModelTally>,
}

#[derive(Debug, Default)]
struct HeatmapDay {
    requests: u64,
    users: HashSet<UserId>,
    prus: f64,
}

#[derive(Debug, Default)]
struct DistributionTally {
    features: FeatureBreakdown,
    interactions: u64,
    prus: f64,
}

// ── ModelUsageAccumulator ─────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ModelUsageAccumulator<'c> {
    catalog: &'c ModelCatalog,
    daily: BTreeMap<NaiveDate, ModelDay>,
    heatmap: BTreeMap<NaiveDate, HeatmapDay>,
    distribution: InsertionMap<String, DistributionTally>,
}

impl<'c> ModelUsageAccumulator<'c> {
    pub fn new(catalog: &'c ModelCatalog) -> Self {
        Self {
            catalog,
            daily: BTreeMap::new(),
            heatmap: BTreeMap::new(),
            distribution: InsertionMap::new(),
        }
    }

    /// Price one `(model, feature)` total and book it on `date`.
    pub fn accumulate_model_feature(
        &mut self,
        date: NaiveDate,
        model: &str,
        feature: &str,
        interactions: u64,
    ) {
        let key = normalize_model_key(model);
        let class = self.catalog.classify(&key);
        let multiplier = self.catalog.multiplier(&key);
        let prus = interactions as f64 * multiplier;

        let day = self.daily.entry(date).or_default();
        day.prus += prus;
        match class {
            ModelClass::Premium => day.premium_requests += interactions,
            ModelClass::Standard => day.standard_requests += interactions,
            ModelClass::Unknown => day.unknown_requests += interactions,
        }
        let tally = day.models.get_or_insert_with(key.as_str(), || ModelTally {
            multiplier,
            is_premium: class == ModelClass::Premium,
            ..Default::default()
        });
        tally.requests += interactions;
        tally.prus += prus;

        if feature == features::CHAT_PANEL_AGENT_MODE && interactions > 0 {
            self.heatmap.entry(date).or_default().prus += prus;
        }

        let dist = self
            .distribution
            .get_or_insert_with(key.as_str(), DistributionTally::default);
        dist.features.add(feature, interactions);
        dist.interactions += interactions;
        dist.prus += prus;
    }

    /// Book agent-mode requests and users from a `totals_by_feature` entry.
    pub fn accumulate_agent_heatmap_from_feature(
        &mut self,
        date: NaiveDate,
        user_id: UserId,
        feature: &str,
        interactions: u64,
    ) {
        if feature != features::CHAT_PANEL_AGENT_MODE || interactions == 0 {
            return;
        }
        let day = self.heatmap.entry(date).or_default();
        day.requests += interactions;
        day.users.insert(user_id);
    }

    // ── Finalisers ────────────────────────────────────────────────────────────

    pub fn compute_model_usage_data(&self) -> Vec<DailyModelUsage> {
        self.daily
            .iter()
            .map(|(date, day)| DailyModelUsage {
                date: *date,
                pru_models: day.premium_requests,
                standard_models: day.standard_requests,
                unknown_models: day.unknown_requests,
                total_prus: round2(day.prus),
                service_value: service_value(day.prus),
            })
            .collect()
    }

    pub fn compute_pru_analysis_data(&self) -> Vec<DailyPruAnalysis> {
        self.daily
            .iter()
            .map(|(date, day)| {
                let mut models: Vec<ModelPruUsage> = day
                    .models
                    .iter()
                    .map(|(name, t)| ModelPruUsage {
                        name: name.clone(),
                        requests: t.requests,
                        prus: round2(t.prus),
                        is_premium: t.is_premium,
                        multiplier: t.multiplier,
                    })
                    .collect();
                models.sort_by(|a, b| {
                    b.prus
                        .total_cmp(&a.prus)
                        .then_with(|| b.requests.cmp(&a.requests))
                });

                let standard_requests = day.standard_requests + day.unknown_requests;
                let (top_model, top_model_prus, top_model_is_premium) = match models.first() {
                    Some(top) => (top.name.clone(), top.prus, top.is_premium),
                    None => ("N/A".to_string(), 0.0, false),
                };

                DailyPruAnalysis {
                    date: *date,
                    pru_requests: day.premium_requests,
                    standard_requests,
                    pru_percentage: percentage(
                        day.premium_requests,
                        day.premium_requests + standard_requests,
                    ),
                    total_prus: round2(day.prus),
                    service_value: service_value(day.prus),
                    top_model,
                    top_model_prus,
                    top_model_is_premium,
                    models,
                }
            })
            .collect()
    }

    /// Days with agent-mode requests; PRUs alone do not open a row.
    pub fn compute_agent_mode_heatmap_data(&self) -> Vec<AgentModeHeatmap> {
        self.heatmap
            .iter()
            .filter(|(_, day)| day.requests > 0)
            .map(|(date, day)| AgentModeHeatmap {
                date: *date,
                agent_mode_requests: day.requests,
                unique_users: day.users.len(),
                intensity: intensity_level(day.requests),
                service_value: service_value(day.prus),
            })
            .collect()
    }

    /// Models by PRUs, then interactions, both descending; ties keep
    /// first-seen order.
    pub fn compute_model_feature_distribution_data(&self) -> Vec<ModelFeatureDistribution> {
        let mut rows: Vec<ModelFeatureDistribution> = self
            .distribution
            .iter()
            .map(|(model, t)| ModelFeatureDistribution {
                model: model.clone(),
                model_display_name: self.catalog.display_name(model),
                multiplier: self.catalog.multiplier(model),
                features: t.features.clone(),
                total_interactions: t.interactions,
                total_prus: round2(t.prus),
                service_value: service_value(t.prus),
            })
            .collect();
        rows.sort_by(|a, b| {
            match b.total_prus.total_cmp(&a.total_prus) {
                Ordering::Equal => b.total_interactions.cmp(&a.total_interactions),
                other => other,
            }
        });
        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
