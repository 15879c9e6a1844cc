//! STYLE_AM_001: Explicit join type.
//!
//! A bare `JOIN` is an inner join; spelling it `INNER JOIN` keeps the intent
//! visible next to `LEFT JOIN` neighbors. Qualified joins are left alone.

use crate::ast::{walk_selects, JoinType, Statement};
use crate::config::{KeywordCase, StyleConfig};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

pub struct ExplicitJoinRule {
    case: KeywordCase,
}

impl ExplicitJoinRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            case: config.keyword_case,
        }
    }
}

impl Default for ExplicitJoinRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for ExplicitJoinRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_AM_001
    }

    fn name(&self) -> &'static str {
        "explicit-inner-join"
    }

    fn description(&self) -> &'static str {
        "Bare JOIN is written as INNER JOIN."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let Some(from) = &select.from else {
                return;
            };
            for join in &from.joins {
                if join.join_type != JoinType::Bare {
                    continue;
                }
                let span = ctx.abs(join.keywords_span);
                let fix = Fix::single(
                    rule_codes::STYLE_AM_001,
                    Edit::insert(span.start, format!("{} ", self.case.apply("inner"))),
                );
                violations.push(
                    Violation::warning(
                        rule_codes::STYLE_AM_001,
                        "Bare 'JOIN' should be written as 'INNER JOIN'.",
                    )
                    .with_span(span)
                    .with_fix(fix),
                );
            }
        });
        Ok(violations)
    }
}
