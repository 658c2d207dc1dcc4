//! Lines-of-code impact series per feature subset.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use metrics_core::models::{features, UserId};
use serde::Serialize;

/// Daily LOC impact of one feature subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRow {
    pub date: NaiveDate,
    pub loc_added: u64,
    pub loc_deleted: u64,
    pub net_change: i64,
    pub user_count: usize,
    pub total_unique_users: usize,
}

/// LOC reported by one `totals_by_feature` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureImpact<'a> {
    pub feature: &'a str,
    pub loc_added: u64,
    pub loc_deleted: u64,
}

/// The feature subsets tracked as separate impact series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactSeries {
    Agent,
    CodeCompletion,
    EditMode,
    InlineMode,
    AskMode,
    Joined,
}

impl ImpactSeries {
    pub const ALL: [ImpactSeries; 6] = [
        ImpactSeries::Agent,
        ImpactSeries::CodeCompletion,
        ImpactSeries::EditMode,
        ImpactSeries::InlineMode,
        ImpactSeries::AskMode,
        ImpactSeries::Joined,
    ];

    pub fn features(self) -> &'static [&'static str] {
        match self {
            ImpactSeries::Agent => &[features::CHAT_PANEL_AGENT_MODE, features::AGENT_EDIT],
            ImpactSeries::CodeCompletion => &[features::CODE_COMPLETION],
            ImpactSeries::EditMode => &[features::CHAT_PANEL_EDIT_MODE],
            ImpactSeries::InlineMode => &[features::CHAT_INLINE],
            ImpactSeries::AskMode => &[features::CHAT_PANEL_ASK_MODE],
            ImpactSeries::Joined => &[
                features::CODE_COMPLETION,
                features::CHAT_PANEL_ASK_MODE,
                features::CHAT_PANEL_EDIT_MODE,
                features::CHAT_INLINE,
                features::CHAT_PANEL_AGENT_MODE,
                features::AGENT_EDIT,
            ],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct ImpactDay {
    loc_added: u64,
    loc_deleted: u64,
    users: HashSet<UserId>,
}

#[derive(Debug, Default)]
struct SeriesState {
    daily: BTreeMap<NaiveDate, ImpactDay>,
    users: HashSet<UserId>,
}

#[derive(Debug, Default)]
pub struct ImpactAccumulator {
    series: [SeriesState; 6],
}

impl ImpactAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `date` in every series so days without activity still get a row.
    pub fn ensure_date(&mut self, date: NaiveDate) {
        for state in &mut self.series {
            state.daily.entry(date).or_default();
        }
    }

    /// Fold one record's feature LOC into every series.
    ///
    /// A series only picks the record up when at least one of its features
    /// moved a line.
    pub fn accumulate_feature_impacts(
        &mut self,
        date: NaiveDate,
        user_id: UserId,
        impacts: &[FeatureImpact<'_>],
    ) {
        for series in ImpactSeries::ALL {
            let subset = series.features();
            let mut added = 0;
            let mut deleted = 0;
            let mut active = false;
            for impact in impacts
                .iter()
                .filter(|i| subset.iter().any(|f| *f == i.feature))
            {
                added += impact.loc_added;
                deleted += impact.loc_deleted;
                active |= impact.loc_added != 0 || impact.loc_deleted != 0;
            }
            if !active {
                continue;
            }

            let state = &mut self.series[series.index()];
            let day = state.daily.entry(date).or_default();
            day.loc_added += added;
            day.loc_deleted += deleted;
            day.users.insert(user_id);
            state.users.insert(user_id);
        }
    }

    pub fn compute(&self, series: ImpactSeries) -> Vec<ImpactRow> {
        let state = &self.series[series.index()];
        let total_unique_users = state.users.len();
        state
            .daily
            .iter()
            .map(|(date, day)| ImpactRow {
                date: *date,
                loc_added: day.loc_added,
                loc_deleted: day.loc_deleted,
                net_change: day.loc_added as i64 - day.loc_deleted as i64,
                user_count: day.users.len(),
                total_unique_users,
            })
            .collect()
    }
}
