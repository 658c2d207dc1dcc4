use std::collections::HashSet;

use chrono::NaiveDate;
use metrics_core::models::{MetricRecord, UserId};
use serde::Serialize;

use super::InsertionMap;

/// Per-user totals over the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_login: String,
    pub user_id: UserId,
    pub total_user_initiated_interactions: u64,
    pub total_code_generation_activities: u64,
    pub total_code_acceptance_activities: u64,
    pub total_loc_added: u64,
    pub total_loc_deleted: u64,
    pub total_loc_suggested_to_add: u64,
    pub total_loc_suggested_to_delete: u64,
    pub days_active: usize,
    pub used_agent: bool,
    pub used_chat: bool,
}

#[derive(Debug)]
struct UserTally {
    summary: UserSummary,
    days: HashSet<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct UserSummaryAccumulator {
    users: InsertionMap<UserId, UserTally>,
}

impl UserSummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, record: &MetricRecord) {
        let tally = self.users.get_or_insert_with(&record.user_id, || UserTally {
            summary: UserSummary {
                user_login: record.user_login.clone(),
                user_id: record.user_id,
                total_user_initiated_interactions: 0,
                total_code_generation_activities: 0,
                total_code_acceptance_activities: 0,
                total_loc_added: 0,
                total_loc_deleted: 0,
                total_loc_suggested_to_add: 0,
                total_loc_suggested_to_delete: 0,
                days_active: 0,
                used_agent: false,
                used_chat: false,
            },
            days: HashSet::new(),
        });

        let s = &mut tally.summary;
        s.total_user_initiated_interactions += record.user_initiated_interaction_count;
        s.total_code_generation_activities += record.code_generation_activity_count;
        s.total_code_acceptance_activities += record.code_acceptance_activity_count;
        s.total_loc_added += record.loc_added_sum;
        s.total_loc_deleted += record.loc_deleted_sum;
        s.total_loc_suggested_to_add += record.loc_suggested_to_add_sum;
        s.total_loc_suggested_to_delete += record.loc_suggested_to_delete_sum;
        s.used_agent |= record.used_agent;
        s.used_chat |= record.used_chat;
        tally.days.insert(record.day);
    }

    /// Users by descending interactions; ties keep first-seen order.
    pub fn compute(&self) -> Vec<UserSummary> {
        let mut summaries: Vec<UserSummary> = self
            .users
            .values()
            .map(|t| UserSummary {
                days_active: t.days.len(),
                ..t.summary.clone()
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.total_user_initiated_interactions
                .cmp(&a.total_user_initiated_interactions)
        });
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(d: u32, user_id: UserId, login: &str, interactions: u64) -> MetricRecord {
        let mut r = MetricRecord::new(NaiveDate::from_ymd_opt(2025, 8, d).unwrap(), user_id, login);
        r.user_initiated_interaction_count = interactions;
        r.loc_added_sum = 5;
        r
    }

    #[test]
    fn test_user_totals_and_days_active() {
        let mut acc = UserSummaryAccumulator::new();
        acc.accumulate(&record(1, 1, "octocat", 3));
        acc.accumulate(&record(1, 1, "octocat", 2));
        let mut agent_day = record(2, 1, "octocat", 1);
        agent_day.used_agent = true;
        acc.accumulate(&agent_day);

        let users = acc.compute();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].total_user_initiated_interactions, 6);
        assert_eq!(users[0].total_loc_added, 15);
        assert_eq!(users[0].days_active, 2);
        assert!(users[0].used_agent);
        assert!(!users[0].used_chat);
    }

    #[test]
    fn test_sorted_by_interactions_with_stable_ties() {
        let mut acc = UserSummaryAccumulator::new();
        acc.accumulate(&record(1, 1, "a", 4));
        acc.accumulate(&record(1, 2, "b", 9));
        acc.accumulate(&record(1, 3, "c", 4));

        let logins: Vec<String> = acc.compute().into_iter().map(|u| u.user_login).collect();
        assert_eq!(logins, vec!["b", "a", "c"]);
    }
}
