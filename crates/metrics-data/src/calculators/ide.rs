use std::collections::HashSet;

use metrics_core::calculations::percentage;
use metrics_core::models::{IdeTotal, PluginVersion, UserId};
use serde::Serialize;

use super::InsertionMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeStats {
    pub ide: String,
    pub unique_users: usize,
    pub total_engagements: u64,
    pub total_generations: u64,
    pub total_acceptances: u64,
    /// Acceptances as a percentage of generations.
    pub acceptance_rate: f64,
    pub loc_added: u64,
    pub loc_deleted: u64,
    pub loc_suggested_to_add: u64,
    pub loc_suggested_to_delete: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_plugin_version: Option<PluginVersion>,
}

#[derive(Debug, Default)]
struct IdeTally {
    users: HashSet<UserId>,
    interactions: u64,
    generations: u64,
    acceptances: u64,
    loc_added: u64,
    loc_deleted: u64,
    loc_suggested_to_add: u64,
    loc_suggested_to_delete: u64,
    latest_plugin: Option<PluginVersion>,
}

#[derive(Debug, Default)]
pub struct IdeAccumulator {
    ides: InsertionMap<String, IdeTally>,
}

impl IdeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, user_id: UserId, total: &IdeTotal) {
        let tally = self
            .ides
            .get_or_insert_with(total.ide.as_str(), IdeTally::default);
        tally.users.insert(user_id);
        tally.interactions += total.user_initiated_interaction_count;
        tally.generations += total.code_generation_activity_count;
        tally.acceptances += total.code_acceptance_activity_count;
        tally.loc_added += total.loc_added_sum;
        tally.loc_deleted += total.loc_deleted_sum;
        tally.loc_suggested_to_add += total.loc_suggested_to_add_sum;
        tally.loc_suggested_to_delete += total.loc_suggested_to_delete_sum;

        if let Some(plugin) = &total.last_known_plugin_version {
            // RFC 3339 timestamps order correctly as strings.
            let newer = match &tally.latest_plugin {
                Some(current) => plugin.sampled_at > current.sampled_at,
                None => true,
            };
            if newer {
                tally.latest_plugin = Some(plugin.clone());
            }
        }
    }

    /// IDEs by descending unique users; ties keep first-seen order.
    pub fn compute(&self) -> Vec<IdeStats> {
        let mut stats: Vec<IdeStats> = self
            .ides
            .iter()
            .map(|(ide, t)| IdeStats {
                ide: ide.clone(),
                unique_users: t.users.len(),
                total_engagements: t.interactions,
                total_generations: t.generations,
                total_acceptances: t.acceptances,
                acceptance_rate: percentage(t.acceptances, t.generations),
                loc_added: t.loc_added,
                loc_deleted: t.loc_deleted,
                loc_suggested_to_add: t.loc_suggested_to_add,
                loc_suggested_to_delete: t.loc_suggested_to_delete,
                latest_plugin_version: t.latest_plugin.clone(),
            })
            .collect();
        stats.sort_by(|a, b| b.unique_users.cmp(&a.unique_users));
        stats
    }
}
