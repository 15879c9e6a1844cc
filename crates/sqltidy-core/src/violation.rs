//! Violation records produced by style checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::fix::Fix;

/// A style violation found in a statement (error, warning, or info).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Severity level
    pub severity: Severity,

    /// Machine-readable rule code
    pub rule: String,

    /// Human-readable message
    pub message: String,

    /// Optional: location in the source text where the violation occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    /// Optional: which statement index this violation relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_index: Option<usize>,

    /// Optional: replacement text the auto-fixer would apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,

    /// Structured edits backing the auto-fix, not serialized.
    #[serde(skip)]
    #[schemars(skip)]
    pub fix: Option<Fix>,
}

impl Violation {
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, rule, message)
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, rule, message)
    }

    pub fn info(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, rule, message)
    }

    fn with_severity(
        severity: Severity,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            rule: rule.into(),
            message: message.into(),
            span: None,
            statement_index: None,
            suggested_fix: None,
            fix: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_statement(mut self, index: usize) -> Self {
        self.statement_index = Some(index);
        self
    }

    pub fn with_suggestion(mut self, text: impl Into<String>) -> Self {
        self.suggested_fix = Some(text.into());
        self
    }

    /// Attaches a structured fix. Single-edit fixes also populate
    /// `suggested_fix` with the replacement text.
    pub fn with_fix(mut self, fix: Fix) -> Self {
        if self.suggested_fix.is_none() {
            if let [edit] = fix.edits.as_slice() {
                self.suggested_fix = Some(edit.replacement.clone());
            }
        }
        self.fix = Some(fix);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Byte offset from the start of the source (inclusive)
    pub start: usize,
    /// Byte offset from the start of the source (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Half-open interval intersection. Spans touching at a boundary do not
    /// overlap; an insertion point strictly inside a span does.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Machine-readable rule codes.
pub mod rule_codes {
    pub const LEX_ERROR: &str = "LEX_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";

    // Capitalisation
    pub const STYLE_CP_001: &str = "STYLE_CP_001";

    // Layout
    pub const STYLE_LT_001: &str = "STYLE_LT_001";
    pub const STYLE_LT_002: &str = "STYLE_LT_002";
    pub const STYLE_LT_003: &str = "STYLE_LT_003";
    pub const STYLE_LT_004: &str = "STYLE_LT_004";
    pub const STYLE_LT_005: &str = "STYLE_LT_005";

    // Convention
    pub const STYLE_CV_001: &str = "STYLE_CV_001";
    pub const STYLE_CV_002: &str = "STYLE_CV_002";
    pub const STYLE_CV_003: &str = "STYLE_CV_003";

    // Naming
    pub const STYLE_NM_001: &str = "STYLE_NM_001";
    pub const STYLE_NM_002: &str = "STYLE_NM_002";

    // Ambiguity
    pub const STYLE_AM_001: &str = "STYLE_AM_001";
    pub const STYLE_AM_002: &str = "STYLE_AM_002";

    // Aliasing
    pub const STYLE_AL_001: &str = "STYLE_AL_001";
    pub const STYLE_AL_002: &str = "STYLE_AL_002";
    pub const STYLE_AL_003: &str = "STYLE_AL_003";

    // References
    pub const STYLE_RF_001: &str = "STYLE_RF_001";

    // Structure
    pub const STYLE_ST_001: &str = "STYLE_ST_001";
    pub const STYLE_ST_002: &str = "STYLE_ST_002";
    pub const STYLE_ST_003: &str = "STYLE_ST_003";
    pub const STYLE_ST_004: &str = "STYLE_ST_004";
    pub const STYLE_ST_005: &str = "STYLE_ST_005";
}
