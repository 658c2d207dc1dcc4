//! Detects users flagged as agent users whose feature totals never report
//! agent mode.

use std::collections::BTreeSet;

use metrics_core::models::{features, MetricRecord, UserId};
use serde::Serialize;

use super::InsertionMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityIssue {
    pub user_login: String,
    pub user_id: UserId,
    pub used_agent: bool,
    /// Chat-panel modes that were reported, sorted.
    pub used_modes: Vec<String>,
}

#[derive(Debug, Default)]
struct UserModes {
    login: String,
    used_agent: bool,
    modes: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct DataQualityAccumulator {
    users: InsertionMap<UserId, UserModes>,
}

impl DataQualityAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, record: &MetricRecord) {
        let entry = self.users.get_or_insert_with(&record.user_id, || UserModes {
            login: record.user_login.clone(),
            ..Default::default()
        });
        entry.used_agent |= record.used_agent;
        for total in &record.totals_by_feature {
            if features::CHAT_PANEL_MODES.iter().any(|m| *m == total.feature) {
                entry.modes.insert(total.feature.clone());
            }
        }
    }

    /// Inconsistent users ordered by login.
    pub fn compute(&self) -> Vec<DataQualityIssue> {
        let mut issues: Vec<DataQualityIssue> = self
            .users
            .iter()
            .filter(|(_, u)| u.used_agent && !u.modes.contains(features::CHAT_PANEL_AGENT_MODE))
            .map(|(user_id, u)| DataQualityIssue {
                user_login: u.login.clone(),
                user_id: *user_id,
                used_agent: u.used_agent,
                used_modes: u.modes.iter().cloned().collect(),
            })
            .collect();
        issues.sort_by(|a, b| a.user_login.cmp(&b.user_login));
        issues
    }
}
