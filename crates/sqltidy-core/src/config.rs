//! Style configuration.
//!
//! All knobs have defaults matching the house style, so `StyleConfig::default()`
//! is a fully usable configuration. Files deserialize with unknown keys
//! rejected, which catches misspelled options early.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Target case for keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
}

impl KeywordCase {
    /// Rewrite `word` into this case.
    pub fn apply(self, word: &str) -> String {
        match self {
            KeywordCase::Upper => word.to_ascii_uppercase(),
            KeywordCase::Lower => word.to_ascii_lowercase(),
        }
    }

    /// True when `word` already has this case.
    pub fn matches(self, word: &str) -> bool {
        self.apply(word) == word
    }

    pub fn label(self) -> &'static str {
        match self {
            KeywordCase::Upper => "upper",
            KeywordCase::Lower => "lower",
        }
    }
}

/// Naming conventions used by the column and table naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConventions {
    /// Prefixes expected on boolean-valued columns.
    pub boolean_prefixes: Vec<String>,
    /// Suffix expected on date-valued columns.
    pub date_suffix: String,
    /// Suffix expected on timestamp-valued columns.
    pub timestamp_suffix: String,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            boolean_prefixes: vec!["is_".to_string(), "has_".to_string(), "does_".to_string()],
            date_suffix: "_date".to_string(),
            timestamp_suffix: "_at".to_string(),
        }
    }
}

impl NamingConventions {
    /// True when `name` starts with one of the boolean prefixes.
    pub fn has_boolean_prefix(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.boolean_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
    }
}

/// Top-level configuration for checking and formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Case keywords are held to.
    pub keyword_case: KeywordCase,
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Most select items allowed on the `SELECT` line before the layout
    /// rule demands one item per line.
    pub max_inline_columns: usize,
    /// Shortest acceptable table alias.
    pub alias_min_length: usize,
    pub naming_conventions: NamingConventions,
    /// Rule codes to leave out of every run.
    pub disabled_rules: Vec<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            keyword_case: KeywordCase::Upper,
            indent_width: 4,
            max_inline_columns: 1,
            alias_min_length: 3,
            naming_conventions: NamingConventions::default(),
            disabled_rules: Vec::new(),
        }
    }
}

impl StyleConfig {
    /// Whether `code` should run under this configuration.
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        !self.disabled_rules.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    /// The indentation string for `levels` levels.
    pub fn indent(&self, levels: usize) -> String {
        " ".repeat(self.indent_width * levels)
    }
}
