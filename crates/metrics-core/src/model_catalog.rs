use std::collections::HashMap;

use serde::Serialize;

/// US dollars charged per premium request unit.
pub const SERVICE_VALUE_RATE: f64 = 0.04;

/// Static facts about one model as billed by the premium-request plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Human-readable name shown in reports.
    pub display_name: String,
    /// Premium request units consumed per request; `0.0` for base-plan models.
    pub multiplier: f64,
}

impl ModelInfo {
    pub fn new(display_name: impl Into<String>, multiplier: f64) -> Self {
        Self {
            display_name: display_name.into(),
            multiplier,
        }
    }

    /// A model is premium whenever it draws down premium request units.
    pub fn is_premium(&self) -> bool {
        self.multiplier > 0.0
    }
}

/// Billing class of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelClass {
    /// Listed with a positive multiplier.
    Premium,
    /// Listed and included in the base plan.
    Standard,
    /// Not present in the catalog.
    Unknown,
}

// ── Built-in table ────────────────────────────────────────────────────────────

/// Build the default catalog keyed by normalised model name.
fn default_catalog() -> HashMap<String, ModelInfo> {
    let entries: &[(&str, &str, f64)] = &[
        // Included in the base plan.
        ("default", "Default", 0.0),
        ("gpt-4.1", "GPT-4.1", 0.0),
        ("gpt-4o", "GPT-4o", 0.0),
        ("gpt-5-mini", "GPT-5 mini", 0.0),
        ("grok-code-fast-1", "Grok Code Fast 1", 0.0),
        // Premium.
        ("claude-3.5-sonnet", "Claude Sonnet 3.5", 1.0),
        ("claude-3.7-sonnet", "Claude Sonnet 3.7", 1.0),
        ("claude-3.7-sonnet-thought", "Claude Sonnet 3.7 Thinking", 1.25),
        ("claude-sonnet-4", "Claude Sonnet 4", 1.0),
        ("claude-sonnet-4.5", "Claude Sonnet 4.5", 1.0),
        ("claude-haiku-4.5", "Claude Haiku 4.5", 0.33),
        ("claude-opus-4", "Claude Opus 4", 10.0),
        ("claude-opus-4.1", "Claude Opus 4.1", 10.0),
        ("gemini-2.0-flash", "Gemini 2.0 Flash", 0.25),
        ("gemini-2.5-pro", "Gemini 2.5 Pro", 1.0),
        ("gpt-4.5", "GPT-4.5", 50.0),
        ("gpt-5", "GPT-5", 1.0),
        ("gpt-5-codex", "GPT-5-Codex", 1.0),
        ("o1", "o1", 10.0),
        ("o3", "o3", 1.0),
        ("o3-mini", "o3-mini", 0.33),
        ("o4-mini", "o4-mini", 0.33),
    ];

    entries
        .iter()
        .map(|(key, name, multiplier)| (key.to_string(), ModelInfo::new(*name, *multiplier)))
        .collect()
}

/// Normalise a model identifier into a catalog key: trimmed and lowercased.
pub fn normalize_model_key(model: &str) -> String {
    model.trim().to_lowercase()
}

// ── ModelCatalog ──────────────────────────────────────────────────────────────

/// Lookup table classifying models as premium or standard and giving their
/// per-request multiplier.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: HashMap<String, ModelInfo>,
}

impl ModelCatalog {
    /// Create a catalog.
    ///
    /// Pass `Some(map)` to override or extend individual models; entries not
    /// present in `custom_models` fall back to the built-in table. Override
    /// keys are normalised the same way lookups are.
    pub fn new(custom_models: Option<HashMap<String, ModelInfo>>) -> Self {
        let mut models = default_catalog();
        if let Some(overrides) = custom_models {
            for (k, v) in overrides {
                models.insert(normalize_model_key(&k), v);
            }
        }
        Self { models }
    }

    /// Resolve `model`, trying the normalised name and then the same name with
    /// a trailing `-YYYY-MM-DD` or `-YYYYMMDD` release suffix removed.
    pub fn lookup(&self, model: &str) -> Option<&ModelInfo> {
        let key = normalize_model_key(model);
        if let Some(info) = self.models.get(&key) {
            return Some(info);
        }
        strip_release_suffix(&key).and_then(|base| self.models.get(base))
    }

    pub fn classify(&self, model: &str) -> ModelClass {
        match self.lookup(model) {
            Some(info) if info.is_premium() => ModelClass::Premium,
            Some(_) => ModelClass::Standard,
            None => ModelClass::Unknown,
        }
    }

    /// Per-request multiplier; unknown models are treated as base-plan (`0.0`).
    pub fn multiplier(&self, model: &str) -> f64 {
        self.lookup(model).map(|info| info.multiplier).unwrap_or(0.0)
    }

    pub fn is_premium(&self, model: &str) -> bool {
        self.classify(model) == ModelClass::Premium
    }

    /// Display name from the catalog, or the raw identifier when unlisted.
    pub fn display_name(&self, model: &str) -> String {
        self.lookup(model)
            .map(|info| info.display_name.clone())
            .unwrap_or_else(|| model.trim().to_string())
    }

    /// Number of models known to the catalog.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Strip a dated release suffix (`-2025-04-14` or `-20250414`).
fn strip_release_suffix(key: &str) -> Option<&str> {
    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    // Compact form: -YYYYMMDD
    if let Some(idx) = key.rfind('-') {
        let suffix = &key[idx + 1..];
        if suffix.len() == 8 && suffix.starts_with("20") && is_digits(suffix) {
            return Some(&key[..idx]);
        }
    }

    // Dashed form: -YYYY-MM-DD
    if key.len() > 11 && key.is_char_boundary(key.len() - 11) {
        let (base, suffix) = key.split_at(key.len() - 11);
        let parts: Vec<&str> = suffix[1..].split('-').collect();
        if suffix.starts_with('-')
            && parts.len() == 3
            && parts[0].len() == 4
            && parts[1].len() == 2
            && parts[2].len() == 2
            && parts.iter().all(|p| is_digits(p))
        {
            return Some(base);
        }
    }

    None
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(None)
    }

    #[test]
    fn test_base_plan_models_are_standard() {
        let c = catalog();
        for model in ["gpt-4.1", "gpt-4o", "default"] {
            assert_eq!(c.classify(model), ModelClass::Standard, "{model}");
            assert_eq!(c.multiplier(model), 0.0);
            assert!(!c.is_premium(model));
        }
    }

    #[test]
    fn test_premium_models_have_multiplier() {
        let c = catalog();
        assert_eq!(c.classify("claude-sonnet-4"), ModelClass::Premium);
        assert_eq!(c.multiplier("claude-sonnet-4"), 1.0);
        assert_eq!(c.multiplier("claude-opus-4"), 10.0);
        assert_eq!(c.multiplier("gemini-2.0-flash"), 0.25);
        assert!(c.is_premium("o3-mini"));
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let c = catalog();
        assert_eq!(c.multiplier("  Claude-Sonnet-4 "), 1.0);
        assert_eq!(c.classify("GPT-4O"), ModelClass::Standard);
    }

    #[test]
    fn test_unknown_model_is_zero_multiplier() {
        let c = catalog();
        assert_eq!(c.classify("mystery-model"), ModelClass::Unknown);
        assert_eq!(c.multiplier("mystery-model"), 0.0);
        assert!(!c.is_premium("mystery-model"));
        assert_eq!(c.display_name(" mystery-model "), "mystery-model");
    }

    #[test]
    fn test_release_suffix_fallback() {
        let c = catalog();
        assert_eq!(c.multiplier("gpt-4o-2024-11-20"), 0.0);
        assert_eq!(c.classify("gpt-4o-2024-11-20"), ModelClass::Standard);
        assert_eq!(c.multiplier("claude-opus-4-20250514"), 10.0);
    }

    #[test]
    fn test_suffix_that_is_not_a_date_is_kept() {
        assert_eq!(strip_release_suffix("gpt-5-mini"), None);
        assert_eq!(strip_release_suffix("model-12345678-extra"), None);
        assert_eq!(strip_release_suffix("o4-mini-2025-04-16"), Some("o4-mini"));
    }

    #[test]
    fn test_display_name() {
        let c = catalog();
        assert_eq!(c.display_name("claude-sonnet-4"), "Claude Sonnet 4");
        assert_eq!(c.display_name("gpt-4.1"), "GPT-4.1");
    }

    #[test]
    fn test_custom_override_extends_and_replaces() {
        let mut overrides = HashMap::new();
        overrides.insert("Claude-3".to_string(), ModelInfo::new("Claude 3", 1.5));
        overrides.insert("gpt-4o".to_string(), ModelInfo::new("GPT-4o", 2.0));
        let c = ModelCatalog::new(Some(overrides));

        assert_eq!(c.multiplier("claude-3"), 1.5);
        assert_eq!(c.classify("claude-3"), ModelClass::Premium);
        assert_eq!(c.multiplier("gpt-4o"), 2.0);
        assert_eq!(c.len(), catalog().len() + 1);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(ModelCatalog::default().len(), catalog().len());
        assert!(!catalog().is_empty());
    }
}
