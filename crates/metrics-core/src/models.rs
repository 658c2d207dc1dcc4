use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Numeric identifier of a seat holder.
pub type UserId = u64;

/// Feature identifiers as they appear in the metrics export.
pub mod features {
    pub const CODE_COMPLETION: &str = "code_completion";
    pub const CODE_REVIEW: &str = "code_review";
    pub const CHAT_INLINE: &str = "chat_inline";
    pub const CHAT_PANEL_ASK_MODE: &str = "chat_panel_ask_mode";
    pub const CHAT_PANEL_AGENT_MODE: &str = "chat_panel_agent_mode";
    pub const CHAT_PANEL_EDIT_MODE: &str = "chat_panel_edit_mode";
    pub const CHAT_PANEL_CUSTOM_MODE: &str = "chat_panel_custom_mode";
    pub const CHAT_PANEL_UNKNOWN_MODE: &str = "chat_panel_unknown_mode";
    pub const AGENT_EDIT: &str = "agent_edit";

    /// Every chat-panel mode reported in `totals_by_feature`.
    pub const CHAT_PANEL_MODES: &[&str] = &[
        CHAT_PANEL_UNKNOWN_MODE,
        CHAT_PANEL_AGENT_MODE,
        CHAT_PANEL_ASK_MODE,
        CHAT_PANEL_CUSTOM_MODE,
        CHAT_PANEL_EDIT_MODE,
    ];
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One line of the usage-metrics export: a single user's activity on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// First day of the report period, repeated on every record.
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_start_day: String,
    /// Last day of the report period, repeated on every record.
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_end_day: String,
    /// Calendar day this record describes.
    pub day: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enterprise_id: String,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_login: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_initiated_interaction_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_delete_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals_by_ide: Vec<IdeTotal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals_by_feature: Vec<FeatureTotal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals_by_language_feature: Vec<LanguageFeatureTotal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals_by_language_model: Vec<LanguageModelTotal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub totals_by_model_feature: Vec<ModelFeatureTotal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_agent: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_chat: bool,
}

impl MetricRecord {
    /// An empty record for `user_id` on `day`, mostly useful as a builder base.
    pub fn new(day: NaiveDate, user_id: UserId, user_login: impl Into<String>) -> Self {
        Self {
            report_start_day: String::new(),
            report_end_day: String::new(),
            day,
            enterprise_id: String::new(),
            user_id,
            user_login: user_login.into(),
            user_initiated_interaction_count: 0,
            code_generation_activity_count: 0,
            code_acceptance_activity_count: 0,
            loc_added_sum: 0,
            loc_deleted_sum: 0,
            loc_suggested_to_add_sum: 0,
            loc_suggested_to_delete_sum: 0,
            totals_by_ide: Vec::new(),
            totals_by_feature: Vec::new(),
            totals_by_language_feature: Vec::new(),
            totals_by_language_model: Vec::new(),
            totals_by_model_feature: Vec::new(),
            used_agent: false,
            used_chat: false,
        }
    }
}

/// Plugin build last observed for an IDE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginVersion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sampled_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plugin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plugin_version: String,
}

/// Activity within a single IDE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeTotal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ide: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_initiated_interaction_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_delete_sum: u64,
    #[serde(default)]
    pub last_known_plugin_version: Option<PluginVersion>,
}

/// Activity attributed to one product feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTotal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_initiated_interaction_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_delete_sum: u64,
}

/// Activity for one (language, feature) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageFeatureTotal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_delete_sum: u64,
}

/// Activity for one (language, model) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageModelTotal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_add_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_suggested_to_delete_sum: u64,
}

/// Activity for one (model, feature) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatureTotal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_initiated_interaction_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_generation_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_acceptance_activity_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_added_sum: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loc_deleted_sum: u64,
}
