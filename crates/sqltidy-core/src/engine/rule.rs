//! The rule trait and the per-statement context rules run against.

use std::ops::Range;

use crate::ast::Statement;
use crate::config::StyleConfig;
use crate::error::RuleError;
use crate::schema::SchemaCatalog;
use crate::tokens::Token;
use crate::violation::{Span, Violation};

/// A single style rule.
///
/// Rules are constructed once per engine from the configuration and then
/// called for every successfully parsed statement. A rule reports findings
/// as violations; returning `Err` marks the rule as failed for the run
/// without stopping the others.
pub trait StyleRule: Send + Sync {
    /// Stable machine-readable code, e.g. `STYLE_CP_001`.
    fn code(&self) -> &'static str;

    /// Short human-readable name, e.g. `keyword-case`.
    fn name(&self) -> &'static str;

    /// One-sentence description for rule listings.
    fn description(&self) -> &'static str;

    fn check(&self, statement: &Statement, ctx: &RuleContext<'_>)
        -> Result<Vec<Violation>, RuleError>;
}

/// Everything a rule can see while checking one statement.
///
/// Tokens and statement spans are relative to the statement's own text;
/// [`RuleContext::abs`] converts them to source coordinates. Violations and
/// edits must carry absolute spans.
pub struct RuleContext<'a> {
    /// The complete source being checked.
    pub sql: &'a str,
    /// Byte range of this statement within `sql`.
    pub statement_range: Range<usize>,
    /// Zero-based index of this statement in the batch.
    pub statement_index: usize,
    /// Lossless token stream of the statement text.
    pub tokens: &'a [Token],
    pub config: &'a StyleConfig,
    pub catalog: Option<&'a SchemaCatalog>,
}

impl<'a> RuleContext<'a> {
    /// The statement's own text.
    pub fn statement_text(&self) -> &'a str {
        &self.sql[self.statement_range.clone()]
    }

    /// Slice the statement text by a statement-relative span.
    pub fn slice(&self, span: Span) -> &'a str {
        &self.statement_text()[span.start..span.end]
    }

    /// Absolutize a statement-relative span.
    pub fn abs(&self, span: Span) -> Span {
        Span::new(
            self.statement_range.start + span.start,
            self.statement_range.start + span.end,
        )
    }

    /// Absolutize a statement-relative byte range.
    pub fn span(&self, start: usize, end: usize) -> Span {
        self.abs(Span::new(start, end))
    }
}
