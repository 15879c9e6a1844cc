//! STYLE_LT_004: Join condition placement.
//!
//! One predicate stays on the `JOIN ... ON` line. Several predicates each
//! take their own line below the join, indented one level, connective first.

use crate::ast::{walk_selects, JoinConstraint, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::Fix;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

use super::layout::{self, GapCheck};

pub struct OnConditionLayoutRule {
    indent_width: usize,
}

impl OnConditionLayoutRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            indent_width: config.indent_width,
        }
    }
}

impl Default for OnConditionLayoutRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for OnConditionLayoutRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_LT_004
    }

    fn name(&self) -> &'static str {
        "join-condition-layout"
    }

    fn description(&self) -> &'static str {
        "Multiple join predicates sit one per line below the join."
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
            let Some(from) = &select.from else {
                return;
            };
            for join in &from.joins {
                let Some(JoinConstraint::On(on)) = &join.constraint else {
                    continue;
                };
                let (leaves, ops) = layout::split_connectives(&on.condition);
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
                    continue;
                }
                let message = if leaves.len() == 1 {
                    "Keep the single join predicate on the ON line."
                } else {
                    "Join predicates belong one per line, with AND/OR leading the line."
                };
                violations.push(
                    Violation::warning(rule_codes::STYLE_LT_004, message)
                        .with_span(ctx.abs(on.keyword_span))
                        .with_fix(Fix::new(rule_codes::STYLE_LT_004, edits)),
                );
            }
        });
        Ok(violations)
    }
}
