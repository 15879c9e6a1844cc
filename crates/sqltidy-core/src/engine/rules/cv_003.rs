//! STYLE_CV_003: Explicit boolean comparison.
//!
//! Boolean columns (recognized by the configured `is_`/`has_`/`does_`
//! prefixes) are compared explicitly in predicates: `is_active = true`, not
//! bare `is_active`, and never `NOT is_active`. The bare form gets an
//! auto-fix; the `NOT` form only a report, since the rewrite moves tokens.

use crate::ast::{
    walk_selects, Expression, JoinConstraint, Statement, UnaryOperator,
};
use crate::config::{KeywordCase, NamingConventions, StyleConfig};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

use super::layout::split_connectives;

pub struct ExplicitBooleanRule {
    case: KeywordCase,
    naming: NamingConventions,
}

impl ExplicitBooleanRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            case: config.keyword_case,
            naming: config.naming_conventions.clone(),
        }
    }

    fn check_predicate(&self, condition: &Expression, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let (leaves, _) = split_connectives(condition);
        for leaf in leaves {
            match leaf {
                Expression::Column(col) => {
                    let Some(name) = col.parts.last().map(|p| p.name.as_str()) else {
                        continue;
                    };
                    if !self.naming.has_boolean_prefix(name) {
                        continue;
                    }
                    let span = ctx.abs(col.span);
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_CV_003,
                            format!("Compare boolean column '{name}' explicitly to true or false."),
                        )
                        .with_span(span)
                        .with_fix(Fix::single(
                            rule_codes::STYLE_CV_003,
                            Edit::insert(span.end, format!(" = {}", self.case.apply("true"))),
                        )),
                    );
                }
                Expression::UnaryOp {
                    op: UnaryOperator::Not,
                    operand,
                    ..
                } => {
                    if let Expression::Column(col) = operand.as_ref() {
                        let Some(name) = col.parts.last().map(|p| p.name.as_str()) else {
                            continue;
                        };
                        if self.naming.has_boolean_prefix(name) {
                            violations.push(
                                Violation::warning(
                                    rule_codes::STYLE_CV_003,
                                    format!("Avoid NOT on '{name}'; write '{name} = false'."),
                                )
                                .with_span(ctx.abs(leaf.span())),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
        violations
    }
}

impl Default for ExplicitBooleanRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for ExplicitBooleanRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_CV_003
    }

    fn name(&self) -> &'static str {
        "explicit-boolean-comparison"
    }

    fn description(&self) -> &'static str {
        "Boolean columns are compared to true/false in predicates."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            if let Some(w) = &select.where_clause {
                violations.extend(self.check_predicate(&w.condition, ctx));
            }
            if let Some(h) = &select.having {
                violations.extend(self.check_predicate(&h.condition, ctx));
            }
            if let Some(from) = &select.from {
                for join in &from.joins {
                    if let Some(JoinConstraint::On(on)) = &join.constraint {
                        violations.extend(self.check_predicate(&on.condition, ctx));
                    }
                }
            }
        });
        Ok(violations)
    }
}
