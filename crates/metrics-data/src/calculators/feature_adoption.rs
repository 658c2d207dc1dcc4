use std::collections::HashSet;

use metrics_core::models::{features, UserId};
use serde::Serialize;

use super::InsertionMap;

/// How many users touched each feature group at least once.
///
/// Groups overlap: a user of both ask and agent mode is counted in each, and
/// once in `chat_users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAdoption {
    pub total_users: usize,
    pub completion_users: usize,
    pub chat_users: usize,
    pub agent_mode_users: usize,
    pub ask_mode_users: usize,
    pub edit_mode_users: usize,
    pub inline_mode_users: usize,
    pub code_review_users: usize,
}

const CHAT_FEATURES: [&str; 4] = [
    features::CHAT_PANEL_UNKNOWN_MODE,
    features::CHAT_PANEL_ASK_MODE,
    features::CHAT_PANEL_AGENT_MODE,
    features::CHAT_PANEL_EDIT_MODE,
];

#[derive(Debug, Default)]
pub struct FeatureAdoptionAccumulator {
    user_features: InsertionMap<UserId, HashSet<String>>,
}

impl FeatureAdoptionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A feature counts as adopted once it shows an interaction or a
    /// generation.
    pub fn accumulate(
        &mut self,
        user_id: UserId,
        feature: &str,
        interactions: u64,
        generations: u64,
    ) {
        if interactions == 0 && generations == 0 {
            return;
        }
        let seen = self.user_features.get_or_insert_with(&user_id, HashSet::new);
        if !seen.contains(feature) {
            seen.insert(feature.to_string());
        }
    }

    pub fn compute(&self) -> FeatureAdoption {
        let mut adoption = FeatureAdoption {
            total_users: self.user_features.len(),
            ..Default::default()
        };
        for seen in self.user_features.values() {
            let has = |f: &str| seen.contains(f);
            if has(features::CODE_COMPLETION) {
                adoption.completion_users += 1;
            }
            if CHAT_FEATURES.iter().any(|f| has(f)) {
                adoption.chat_users += 1;
            }
            if has(features::CHAT_PANEL_AGENT_MODE) {
                adoption.agent_mode_users += 1;
            }
            if has(features::CHAT_PANEL_ASK_MODE) {
                adoption.ask_mode_users += 1;
            }
            if has(features::CHAT_PANEL_EDIT_MODE) {
                adoption.edit_mode_users += 1;
            }
            if has(features::CHAT_INLINE) {
                adoption.inline_mode_users += 1;
            }
            if has(features::CODE_REVIEW) {
                adoption.code_review_users += 1;
            }
        }
        adoption
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_overlap_but_chat_is_deduplicated() {
        let mut acc = FeatureAdoptionAccumulator::new();
        acc.accumulate(1, features::CHAT_PANEL_ASK_MODE, 2, 0);
        acc.accumulate(1, features::CHAT_PANEL_AGENT_MODE, 1, 0);
        acc.accumulate(2, features::CODE_COMPLETION, 0, 7);
        acc.accumulate(3, features::CHAT_INLINE, 1, 0);
        acc.accumulate(3, features::CODE_REVIEW, 1, 0);

        let adoption = acc.compute();
        assert_eq!(adoption.total_users, 3);
        assert_eq!(adoption.chat_users, 1);
        assert_eq!(adoption.ask_mode_users, 1);
        assert_eq!(adoption.agent_mode_users, 1);
        assert_eq!(adoption.completion_users, 1);
        assert_eq!(adoption.inline_mode_users, 1);
        assert_eq!(adoption.code_review_users, 1);
        assert!(adoption.chat_users <= adoption.total_users);
        assert!(adoption.ask_mode_users + adoption.agent_mode_users > adoption.chat_users);
    }

    #[test]
    fn test_inactive_features_do_not_count() {
        let mut acc = FeatureAdoptionAccumulator::new();
        acc.accumulate(1, features::CODE_COMPLETION, 0, 0);
        assert_eq!(acc.compute(), FeatureAdoption::default());
    }

    #[test]
    fn test_unknown_panel_mode_counts_as_chat() {
        let mut acc = FeatureAdoptionAccumulator::new();
        acc.accumulate(5, features::CHAT_PANEL_UNKNOWN_MODE, 1, 0);
        let adoption = acc.compute();
        assert_eq!(adoption.chat_users, 1);
        assert_eq!(adoption.ask_mode_users, 0);
    }
}
