//! Headline usage statistics: user counts by usage pattern and the top
//! language, IDE and model.

use std::collections::HashSet;

use metrics_core::models::UserId;
use serde::Serialize;

use super::{first_max, InsertionMap};

const NOT_AVAILABLE: &str = "N/A";

// ── Output ────────────────────────────────────────────────────────────────────

/// Top language or model ranked by generations plus acceptances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEngagement {
    pub name: String,
    pub engagements: u64,
}

/// Top IDE ranked by distinct users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIde {
    pub name: String,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsStats {
    pub unique_users: usize,
    pub chat_users: usize,
    pub agent_users: usize,
    pub completion_only_users: usize,
    pub report_start_day: String,
    pub report_end_day: String,
    pub total_records: usize,
    pub top_language: TopEngagement,
    pub top_ide: TopIde,
    pub top_model: TopEngagement,
}

// ── Accumulator ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct UsageFlags {
    used_chat: bool,
    used_agent: bool,
}

#[derive(Debug, Default)]
pub struct StatsAccumulator {
    users: InsertionMap<UserId, UsageFlags>,
    ide_users: InsertionMap<String, HashSet<UserId>>,
    language_engagements: InsertionMap<String, u64>,
    model_engagements: InsertionMap<String, u64>,
    report_period: Option<(String, String)>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the report period; only the first call has any effect.
    pub fn set_report_period(&mut self, start_day: &str, end_day: &str) {
        if self.report_period.is_none() {
            self.report_period = Some((start_day.to_string(), end_day.to_string()));
        }
    }

    pub fn accumulate_user_usage(&mut self, user_id: UserId, used_chat: bool, used_agent: bool) {
        let flags = self.users.get_or_insert_with(&user_id, UsageFlags::default);
        flags.used_chat |= used_chat;
        flags.used_agent |= used_agent;
    }

    pub fn accumulate_ide_user(&mut self, ide: &str, user_id: UserId) {
        self.ide_users
            .get_or_insert_with(ide, HashSet::new)
            .insert(user_id);
    }

    pub fn accumulate_language_engagement(&mut self, language: &str, engagements: u64) {
        *self.language_engagements.get_or_insert_with(language, || 0) += engagements;
    }

    pub fn accumulate_model_engagement(&mut self, model: &str, engagements: u64) {
        *self.model_engagements.get_or_insert_with(model, || 0) += engagements;
    }

    pub fn compute(&self, total_records: usize) -> MetricsStats {
        let mut chat_users = 0;
        let mut agent_users = 0;
        let mut completion_only_users = 0;
        for flags in self.users.values() {
            if flags.used_chat {
                chat_users += 1;
            }
            if flags.used_agent {
                agent_users += 1;
            }
            if !flags.used_chat && !flags.used_agent {
                completion_only_users += 1;
            }
        }

        let (report_start_day, report_end_day) = self.report_period.clone().unwrap_or_default();

        MetricsStats {
            unique_users: self.users.len(),
            chat_users,
            agent_users,
            completion_only_users,
            report_start_day,
            report_end_day,
            total_records,
            top_language: top_engagement(&self.language_engagements),
            top_ide: self.top_ide(),
            top_model: top_engagement(&self.model_engagements),
        }
    }

    fn top_ide(&self) -> TopIde {
        let entries: Vec<(&String, usize)> = self
            .ide_users
            .iter()
            .map(|(ide, users)| (ide, users.len()))
            .collect();
        match first_max(entries.iter(), |(_, n)| *n) {
            Some((ide, n)) => TopIde {
                name: (*ide).clone(),
                entries: *n,
            },
            None => TopIde {
                name: NOT_AVAILABLE.to_string(),
                entries: 0,
            },
        }
    }
}

fn top_engagement(totals: &InsertionMap<String, u64>) -> TopEngagement {
    let entries: Vec<(&String, &u64)> = totals.iter().collect();
    match first_max(entries.iter(), |(_, n)| **n) {
        Some((name, n)) => TopEngagement {
            name: (*name).clone(),
            engagements: **n,
        },
        None => TopEngagement {
            name: NOT_AVAILABLE.to_string(),
            engagements: 0,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let stats = StatsAccumulator::new().compute(0);
        assert_eq!(stats.unique_users, 0);
        assert_eq!(stats.top_language.name, "N/A");
        assert_eq!(stats.top_language.engagements, 0);
        assert_eq!(stats.top_ide.name, "N/A");
        assert_eq!(stats.top_ide.entries, 0);
        assert_eq!(stats.top_model.name, "N/A");
        assert_eq!(stats.report_start_day, "");
    }

    #[test]
    fn test_user_flags_are_or_accumulated() {
        let mut acc = StatsAccumulator::new();
        acc.accumulate_user_usage(1, true, false);
        acc.accumulate_user_usage(1, false, true);
        acc.accumulate_user_usage(2, false, false);
        acc.accumulate_user_usage(3, true, false);

        let stats = acc.compute(4);
        assert_eq!(stats.unique_users, 3);
        assert_eq!(stats.chat_users, 2);
        assert_eq!(stats.agent_users, 1);
        assert_eq!(stats.completion_only_users, 1);
        assert_eq!(stats.total_records, 4);
    }

    #[test]
    fn test_top_language_tie_goes_to_first_seen() {
        let mut acc = StatsAccumulator::new();
        acc.accumulate_language_engagement("python", 10);
        acc.accumulate_language_engagement("rust", 6);
        acc.accumulate_language_engagement("rust", 4);

        let stats = acc.compute(1);
        assert_eq!(stats.top_language.name, "python");
        assert_eq!(stats.top_language.engagements, 10);
    }

    #[test]
    fn test_top_ide_counts_distinct_users() {
        let mut acc = StatsAccumulator::new();
        for _ in 0..5 {
            acc.accumulate_ide_user("vscode", 1);
        }
        acc.accumulate_ide_user("jetbrains", 2);
        acc.accumulate_ide_user("jetbrains", 3);

        let stats = acc.compute(7);
        assert_eq!(stats.top_ide.name, "jetbrains");
        assert_eq!(stats.top_ide.entries, 2);
    }

    #[test]
    fn test_top_model() {
        let mut acc = StatsAccumulator::new();
        acc.accumulate_model_engagement("gpt-4.1", 3);
        acc.accumulate_model_engagement("claude-sonnet-4", 8);

        let stats = acc.compute(2);
        assert_eq!(stats.top_model.name, "claude-sonnet-4");
        assert_eq!(stats.top_model.engagements, 8);
    }

    #[test]
    fn test_report_period_first_call_wins() {
        let mut acc = StatsAccumulator::new();
        acc.set_report_period("2025-07-07", "2025-08-03");
        acc.set_report_period("2025-01-01", "2025-01-28");

        let stats = acc.compute(2);
        assert_eq!(stats.report_start_day, "2025-07-07");
        assert_eq!(stats.report_end_day, "2025-08-03");
    }
}
