use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use metrics_core::calculations::percentage;
use metrics_core::models::UserId;
use serde::Serialize;

/// Share of the window's users active on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEngagement {
    pub date: NaiveDate,
    pub active_users: usize,
    pub total_users: usize,
    pub engagement_percentage: f64,
}

#[derive(Debug, Default)]
pub struct EngagementAccumulator {
    daily: BTreeMap<NaiveDate, HashSet<UserId>>,
    all_users: HashSet<UserId>,
}

impl EngagementAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, date: NaiveDate, user_id: UserId) {
        self.all_users.insert(user_id);
        self.daily.entry(date).or_default().insert(user_id);
    }

    /// One row per active date, ascending; `total_users` is the same on every
    /// row.
    pub fn compute(&self) -> Vec<DailyEngagement> {
        let total_users = self.all_users.len();
        self.daily
            .iter()
            .map(|(date, users)| DailyEngagement {
                date: *date,
                active_users: users.len(),
                total_users,
                engagement_percentage: percentage(users.len() as u64, total_users as u64),
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
    fn test_engagement_rows_sorted_with_global_total() {
        let mut acc = EngagementAccumulator::new();
        acc.accumulate(day(3), 1);
        acc.accumulate(day(1), 1);
        acc.accumulate(day(1), 2);
        acc.accumulate(day(1), 2);
        acc.accumulate(day(2), 3);

        let rows = acc.compute();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert!(rows.iter().all(|r| r.total_users == 3));
        assert_eq!(rows[0].active_users, 2);
        assert_eq!(rows[0].engagement_percentage, 66.67);
        assert_eq!(rows[1].engagement_percentage, 33.33);
    }

    #[test]
    fn test_active_users_never_exceed_total() {
        let mut acc = EngagementAccumulator::new();
        for user in 0..10 {
            for d in 1..=4 {
                if (user + d) % 3 != 0 {
                    acc.accumulate(day(d as u32), user);
                }
            }
        }
        let rows = acc.compute();
        let active: usize = rows.iter().map(|r| r.active_users).sum();
        assert!(active <= rows[0].total_users * rows.len());
        assert!(rows.iter().all(|r| r.engagement_percentage <= 100.0));
    }

    #[test]
    fn test_empty() {
        assert!(EngagementAccumulator::new().compute().is_empty());
    }
}
