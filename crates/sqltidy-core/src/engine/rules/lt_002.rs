//! STYLE_LT_002: WHERE indentation.
//!
//! A single condition stays on the `WHERE` line. Multiple conditions go one
//! per line, indented one level, with the `AND`/`OR` connective starting the
//! line it introduces, never trailing. `HAVING` follows the same shape.
//!
//! Conditions are split on the top-level connective spine only; a
//! parenthesized group counts as one condition.

use crate::ast::{walk_selects, Expression, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::Fix;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Span, Violation};

use super::layout::{self, GapCheck};

pub struct WhereLayoutRule {
    indent_width: usize,
}

impl WhereLayoutRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            indent_width: config.indent_width,
        }
    }

    fn check_condition(
        &self,
        ctx: &RuleContext<'_>,
        base: &str,
        label: &str,
        keyword_span: Span,
        condition: &Expression,
    ) -> Option<Violation> {
        let (leaves, ops) = layout::split_connectives(condition);
        let mut gaps: Vec<GapCheck> = Vec::new();
        let mut require = |offset: usize, want: String| {
            if let Some(span) = layout::gap_before(ctx.tokens, offset) {
                gaps.push(GapCheck { span, want });
            }
        };

        if leaves.len() == 1 {
            require(leaves[0].span().start, " ".to_string());
        } else {
            let sep = format!("\n{base}{}", " ".repeat(self.indent_width));
            require(leaves[0].span().start, sep.clone());
            for (op, leaf) in ops.iter().zip(&leaves[1..]) {
                require(op.start, sep.clone());
                require(leaf.span().start, " ".to_string());
            }
        }

        let edits = layout::diff_gaps(ctx, &gaps);
        if edits.is_empty() {
            return None;
        }
        let message = if leaves.len() == 1 {
            format!("Keep the single condition on the {label} line.")
        } else {
            format!("{label} conditions belong one per line, with AND/OR leading the line.")
        };
        Some(
            Violation::warning(rule_codes::STYLE_LT_002, message)
                .with_span(ctx.abs(keyword_span))
                .with_fix(Fix::new(rule_codes::STYLE_LT_002, edits)),
        )
    }
}

impl Default for WhereLayoutRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for WhereLayoutRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_LT_002
    }

    fn name(&self) -> &'static str {
        "where-indentation"
    }

    fn description(&self) -> &'static str {
        "Multiple WHERE conditions sit one per line with leading connectives."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let text = ctx.statement_text();
            let Some(base) = layout::indent_if_line_leading(text, select.select_span.start)
            else {
                return;
            };
            if let Some(w) = &select.where_clause {
                violations.extend(self.check_condition(
                    ctx,
                    base,
                    "WHERE",
                    w.keyword_span,
                    &w.condition,
                ));
            }
            if let Some(h) = &select.having {
                violations.extend(self.check_condition(
                    ctx,
                    base,
                    "HAVING",
                    h.keyword_span,
                    &h.condition,
                ));
            }
        });
        Ok(violations)
    }
}
