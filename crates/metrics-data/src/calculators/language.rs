use std::collections::HashSet;

use metrics_core::models::{LanguageFeatureTotal, UserId};
use serde::Serialize;

use super::InsertionMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStats {
    pub language: String,
    pub total_generations: u64,
    pub total_acceptances: u64,
    pub total_engagements: u64,
    pub unique_users: usize,
    pub loc_added: u64,
    pub loc_deleted: u64,
    pub loc_suggested_to_add: u64,
    pub loc_suggested_to_delete: u64,
}

/// `true` when `language` should be dropped under the unknown-language policy:
/// `unknown` in any case, or blank.
pub fn should_filter_language(language: &str, remove_unknown_languages: bool) -> bool {
    if !remove_unknown_languages {
        return false;
    }
    let trimmed = language.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown")
}

#[derive(Debug, Default)]
struct LanguageTally {
    generations: u64,
    acceptances: u64,
    loc_added: u64,
    loc_deleted: u64,
    loc_suggested_to_add: u64,
    loc_suggested_to_delete: u64,
    users: HashSet<UserId>,
}

#[derive(Debug, Default)]
pub struct LanguageAccumulator {
    languages: InsertionMap<String, LanguageTally>,
}

impl LanguageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, user_id: UserId, total: &LanguageFeatureTotal) {
        let tally = self
            .languages
            .get_or_insert_with(total.language.as_str(), LanguageTally::default);
        tally.generations += total.code_generation_activity_count;
        tally.acceptances += total.code_acceptance_activity_count;
        tally.loc_added += total.loc_added_sum;
        tally.loc_deleted += total.loc_deleted_sum;
        tally.loc_suggested_to_add += total.loc_suggested_to_add_sum;
        tally.loc_suggested_to_delete += total.loc_suggested_to_delete_sum;
        tally.users.insert(user_id);
    }

    /// Languages by descending engagements; ties keep first-seen order.
    pub fn compute(&self) -> Vec<LanguageStats> {
        let mut stats: Vec<LanguageStats> = self
            .languages
            .iter()
            .map(|(language, t)| LanguageStats {
                language: language.clone(),
                total_generations: t.generations,
                total_acceptances: t.acceptances,
                total_engagements: t.generations + t.acceptances,
                unique_users: t.users.len(),
                loc_added: t.loc_added,
                loc_deleted: t.loc_deleted,
                loc_suggested_to_add: t.loc_suggested_to_add,
                loc_suggested_to_delete: t.loc_suggested_to_delete,
            })
            .collect();
        stats.sort_by(|a, b| b.total_engagements.cmp(&a.total_engagements));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(language: &str, generations: u64, acceptances: u64) -> LanguageFeatureTotal {
        LanguageFeatureTotal {
            language: language.to_string(),
            feature: "code_completion".to_string(),
            code_generation_activity_count: generations,
            code_acceptance_activity_count: acceptances,
            loc_added_sum: generations * 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_should_filter_language() {
        assert!(should_filter_language("unknown", true));
        assert!(should_filter_language("Unknown", true));
        assert!(should_filter_language("", true));
        assert!(should_filter_language("   ", true));
        assert!(!should_filter_language("rust", true));
        assert!(!should_filter_language("unknown", false));
        assert!(!should_filter_language("", false));
    }

    #[test]
    fn test_sorted_by_engagements_with_stable_ties() {
        let mut acc = LanguageAccumulator::new();
        acc.accumulate(1, &total("go", 2, 1));
        acc.accumulate(1, &total("python", 5, 5));
        acc.accumulate(2, &total("rust", 1, 2));
        acc.accumulate(2, &total("python", 1, 0));

        let stats = acc.compute();
        let names: Vec<&str> = stats.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(names, vec!["python", "go", "rust"]);
        assert_eq!(stats[0].total_engagements, 11);
        assert_eq!(stats[0].unique_users, 2);
        assert_eq!(stats[0].loc_added, 12);
    }
}
