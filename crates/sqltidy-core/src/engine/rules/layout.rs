//! Shared geometry for the layout rules.
//!
//! Layout rules reason about *gaps*: the trivia run between two significant
//! tokens. Each rule owns a disjoint set of gaps and states the text it wants
//! in each one, so their fixes can never collide. Gaps that contain a comment
//! are left untouched; a comment pins the layout around it.

use crate::ast::Expression;
use crate::engine::fix::Edit;
use crate::engine::rule::RuleContext;
use crate::tokens::Token;
use crate::violation::Span;

/// One gap and the text it should hold. Spans are statement-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GapCheck {
    pub span: Span,
    pub want: String,
}

/// The trivia run ending at the significant token that starts at `offset`.
/// Empty when the token directly follows its left neighbor. `None` when no
/// significant token starts there.
pub(crate) fn gap_before(tokens: &[Token], offset: usize) -> Option<Span> {
    let idx = tokens
        .iter()
        .position(|t| t.start == offset && !t.is_trivia())?;
    let start = tokens[..idx]
        .iter()
        .rev()
        .find(|t| !t.is_trivia())
        .map(|t| t.end)
        .unwrap_or(0);
    Some(Span::new(start, offset))
}

pub(crate) fn gap_has_comment(tokens: &[Token], gap: Span) -> bool {
    tokens
        .iter()
        .any(|t| t.kind.is_comment() && t.start >= gap.start && t.end <= gap.end)
}

/// First significant token starting at or after `offset`.
pub(crate) fn next_significant(tokens: &[Token], offset: usize) -> Option<&Token> {
    tokens.iter().find(|t| !t.is_trivia() && t.start >= offset)
}

/// Significant tokens whose spans fall inside `span`.
pub(crate) fn significant_within(tokens: &[Token], span: Span) -> Vec<&Token> {
    tokens
        .iter()
        .filter(|t| !t.is_trivia() && t.start >= span.start && t.end <= span.end)
        .collect()
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &text[line_start..];
    let ws_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..ws_len]
}

/// `Some(indent)` when only whitespace precedes `offset` on its line, i.e.
/// the offset starts a line. Mid-line constructs get `None` and the layout
/// rules leave their line structure alone.
pub(crate) fn indent_if_line_leading(text: &str, offset: usize) -> Option<&str> {
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &text[line_start..offset];
    prefix
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then_some(prefix)
}

/// In-order decomposition of a condition over its top-level `AND`/`OR`
/// spine: the operand expressions left to right, and the connective operator
/// spans between them (`ops.len() == leaves.len() - 1`).
pub(crate) fn split_connectives(expr: &Expression) -> (Vec<&Expression>, Vec<Span>) {
    fn go<'a>(expr: &'a Expression, leaves: &mut Vec<&'a Expression>, ops: &mut Vec<Span>) {
        if let Expression::BinaryOp {
            left,
            op,
            op_span,
            right,
            ..
        } = expr
        {
            if op.is_connective() {
                go(left, leaves, ops);
                ops.push(*op_span);
                go(right, leaves, ops);
                return;
            }
        }
        leaves.push(expr);
    }
    let mut leaves = Vec::new();
    let mut ops = Vec::new();
    go(expr, &mut leaves, &mut ops);
    (leaves, ops)
}

/// Compare planned gaps against the statement text and return replacement
/// edits (absolute spans) for the ones that differ. Comment-bearing gaps are
/// skipped.
pub(crate) fn diff_gaps(ctx: &RuleContext<'_>, gaps: &[GapCheck]) -> Vec<Edit> {
    let text = ctx.statement_text();
    let mut edits = Vec::new();
    for gap in gaps {
        if gap_has_comment(ctx.tokens, gap.span) {
            continue;
        }
        if &text[gap.span.start..gap.span.end] != gap.want {
            edits.push(Edit::replace(ctx.abs(gap.span), gap.want.clone()));
        }
    }
    edits
}
