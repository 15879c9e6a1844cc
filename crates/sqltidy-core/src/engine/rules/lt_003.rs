//! STYLE_LT_003: Parenthesis spacing.
//!
//! No whitespace just inside `(` or `)` when the parenthesis and its
//! neighbor share a line. Newline-bearing runs are layout, not padding, and
//! stay.

use std::collections::HashSet;

use crate::ast::Statement;
use crate::config::StyleConfig;
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::tokens::TokenKind;
use crate::violation::{rule_codes, Violation};

pub struct ParenSpacingRule;

impl ParenSpacingRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for ParenSpacingRule {
    fn default() -> Self {
        Self
    }
}

impl StyleRule for ParenSpacingRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_LT_003
    }

    fn name(&self) -> &'static str {
        "paren-spacing"
    }

    fn description(&self) -> &'static str {
        "No whitespace immediately inside parentheses."
    }

    fn check(
        &self,
        _statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        // A lone run between `(` and `)` is flagged once, from the `(` side.
        let mut claimed: HashSet<usize> = HashSet::new();
        for (i, token) in ctx.tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LParen => {
                    let Some(next) = ctx.tokens.get(i + 1) else {
                        continue;
                    };
                    if next.kind == TokenKind::Whitespace && !next.text.contains('\n') {
                        claimed.insert(i + 1);
                        violations.push(padding_violation(ctx, next.start, next.end, "after '('"));
                    }
                }
                TokenKind::RParen => {
                    if i == 0 {
                        continue;
                    }
                    let prev = &ctx.tokens[i - 1];
                    if prev.kind == TokenKind::Whitespace
                        && !prev.text.contains('\n')
                        && !claimed.contains(&(i - 1))
                    {
                        violations.push(padding_violation(ctx, prev.start, prev.end, "before ')'"));
                    }
                }
                _ => {}
            }
        }
        Ok(violations)
    }
}

fn padding_violation(ctx: &RuleContext<'_>, start: usize, end: usize, place: &str) -> Violation {
    let span = ctx.span(start, end);
    Violation::warning(
        rule_codes::STYLE_LT_003,
        format!("Whitespace {place}."),
    )
    .with_span(span)
    .with_fix(Fix::single(rule_codes::STYLE_LT_003, Edit::delete(span)))
}
