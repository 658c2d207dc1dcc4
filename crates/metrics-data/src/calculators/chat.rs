//! Daily chat activity split by mode.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use metrics_core::models::{features, UserId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChatUsers {
    pub date: NaiveDate,
    pub ask_mode_users: usize,
    pub agent_mode_users: usize,
    pub edit_mode_users: usize,
    pub inline_mode_users: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChatRequests {
    pub date: NaiveDate,
    pub ask_mode_requests: u64,
    pub agent_mode_requests: u64,
    pub edit_mode_requests: u64,
    pub inline_mode_requests: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatMode {
    Ask,
    Agent,
    Edit,
    Inline,
}

impl ChatMode {
    fn from_feature(feature: &str) -> Option<Self> {
        match feature {
            features::CHAT_PANEL_ASK_MODE => Some(Self::Ask),
            features::CHAT_PANEL_AGENT_MODE => Some(Self::Agent),
            features::CHAT_PANEL_EDIT_MODE => Some(Self::Edit),
            features::CHAT_INLINE => Some(Self::Inline),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ModeTally {
    users: HashSet<UserId>,
    requests: u64,
}

#[derive(Debug, Default)]
struct ChatDay {
    ask: ModeTally,
    agent: ModeTally,
    edit: ModeTally,
    inline: ModeTally,
}

impl ChatDay {
    fn mode_mut(&mut self, mode: ChatMode) -> &mut ModeTally {
        match mode {
            ChatMode::Ask => &mut self.ask,
            ChatMode::Agent => &mut self.agent,
            ChatMode::Edit => &mut self.edit,
            ChatMode::Inline => &mut self.inline,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatAccumulator {
    daily: BTreeMap<NaiveDate, ChatDay>,
}

impl ChatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one feature total. Only the four chat modes with at least one
    /// interaction contribute.
    pub fn accumulate_feature(
        &mut self,
        date: NaiveDate,
        user_id: UserId,
        feature: &str,
        interactions: u64,
    ) {
        if interactions == 0 {
            return;
        }
        let Some(mode) = ChatMode::from_feature(feature) else {
            return;
        };
        let tally = self.daily.entry(date).or_default().mode_mut(mode);
        tally.users.insert(user_id);
        tally.requests += interactions;
    }

    pub fn compute_users(&self) -> Vec<DailyChatUsers> {
        self.daily
            .iter()
            .map(|(date, day)| DailyChatUsers {
                date: *date,
                ask_mode_users: day.ask.users.len(),
                agent_mode_users: day.agent.users.len(),
                edit_mode_users: day.edit.users.len(),
                inline_mode_users: day.inline.users.len(),
            })
            .collect()
    }

    pub fn compute_requests(&self) -> Vec<DailyChatRequests> {
        self.daily
            .iter()
            .map(|(date, day)| DailyChatRequests {
                date: *date,
                ask_mode_requests: day.ask.requests,
                agent_mode_requests: day.agent.requests,
                edit_mode_requests: day.edit.requests,
                inline_mode_requests: day.inline.requests,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn test_modes_counted_per_day() {
        let mut acc = ChatAccumulator::new();
        acc.accumulate_feature(day(2), 1, features::CHAT_PANEL_AGENT_MODE, 4);
        acc.accumulate_feature(day(2), 2, features::CHAT_PANEL_AGENT_MODE, 1);
        acc.accumulate_feature(day(2), 1, features::CHAT_INLINE, 3);
        acc.accumulate_feature(day(1), 1, features::CHAT_PANEL_ASK_MODE, 2);
        acc.accumulate_feature(day(1), 1, features::CHAT_PANEL_ASK_MODE, 2);

        let users = acc.compute_users();
        let requests = acc.compute_requests();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].date, day(1));
        assert_eq!(users[0].ask_mode_users, 1);
        assert_eq!(requests[0].ask_mode_requests, 4);
        assert_eq!(users[1].agent_mode_users, 2);
        assert_eq!(users[1].inline_mode_users, 1);
        assert_eq!(requests[1].agent_mode_requests, 5);
        assert_eq!(requests[1].edit_mode_requests, 0);
    }

    #[test]
    fn test_zero_interactions_ignored() {
        let mut acc = ChatAccumulator::new();
        acc.accumulate_feature(day(1), 1, features::CHAT_PANEL_EDIT_MODE, 0);
        assert!(acc.compute_users().is_empty());
    }

    #[test]
    fn test_unrecognized_features_ignored() {
        let mut acc = ChatAccumulator::new();
        acc.accumulate_feature(day(1), 1, features::CODE_COMPLETION, 9);
        acc.accumulate_feature(day(1), 1, features::CHAT_PANEL_CUSTOM_MODE, 9);
        assert!(acc.compute_requests().is_empty());
    }
}
