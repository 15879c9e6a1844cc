//! STYLE_ST_002: Join predicates read downward.
//!
//! In `a JOIN b ON ... = ...` the column from the table that entered the
//! query first goes on the left of the equality. The fix swaps the two
//! sides, which is only safe for `=`, so other operators are reported as-is
//! without one.

use crate::ast::{walk_selects, BinaryOperator, Expression, JoinConstraint, Statement};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::engine::rules::table_scope;
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

use super::layout;

#[derive(Default)]
pub struct JoinDirectionRule;

impl JoinDirectionRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

fn qualifier(expr: &Expression) -> Option<&str> {
    let Expression::Column(col) = expr else {
        return None;
    };
    if col.parts.len() < 2 {
        return None;
    }
    Some(col.parts[col.parts.len() - 2].name.as_str())
}

impl StyleRule for JoinDirectionRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_ST_002
    }

    fn name(&self) -> &'static str {
        "join-direction"
    }

    fn description(&self) -> &'static str {
        "ON equalities lead with the column of the table joined earlier."
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
            let scope = table_scope(select);
            for (index, join) in from.joins.iter().enumerate() {
                let Some(JoinConstraint::On(on)) = &join.constraint else {
                    continue;
                };
                // Scope entries line up with [base, joins...]; everything
                // before this join counts as "earlier".
                let joined = &scope[index + 1];
                let earlier = &scope[..index + 1];
                let (leaves, _) = layout::split_connectives(&on.condition);
                for leaf in leaves {
                    let Expression::BinaryOp {
                        span,
                        left,
                        op: BinaryOperator::Eq,
                        right,
                        ..
                    } = leaf
                    else {
                        continue;
                    };
                    let (Some(lq), Some(rq)) = (qualifier(left), qualifier(right)) else {
                        continue;
                    };
                    if !joined.matches(lq) || !earlier.iter().any(|e| e.matches(rq)) {
                        continue;
                    }
                    let left_span = ctx.abs(left.span());
                    let right_span = ctx.abs(right.span());
                    let left_text = ctx.slice(left.span());
                    let right_text = ctx.slice(right.span());
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_ST_002,
                            format!(
                                "Put the earlier table's column first: '{right_text} = {left_text}'."
                            ),
                        )
                        .with_span(ctx.abs(*span))
                        .with_fix(Fix::new(
                            rule_codes::STYLE_ST_002,
                            vec![
                                Edit::replace(left_span, right_text),
                                Edit::replace(right_span, left_text),
                            ],
                        )),
                    );
                }
            }
        });
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::engine::StyleEngine;
    use crate::parser::parse;
    use crate::tokens::tokenize;

    fn check_sql(sql: &str) -> Vec<Violation> {
        let tokens = tokenize(sql).unwrap();
        let statement = parse(&tokens).unwrap();
        let config = StyleConfig::default();
        let ctx = RuleContext {
            sql,
            statement_range: 0..sql.len(),
            statement_index: 0,
            tokens: &tokens,
            config: &config,
            catalog: None,
        };
        JoinDirectionRule.check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_reversed_equality_flagged() {
        let sql = "SELECT users.id\nFROM users\nINNER JOIN charges ON charges.user_id = users.id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Put the earlier table's column first: 'users.id = charges.user_id'."
        );
    }

    #[test]
    fn test_forward_equality_ok() {
        let sql = "SELECT users.id\nFROM users\nINNER JOIN charges ON users.id = charges.user_id";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_second_join_measured_against_both_earlier_tables() {
        let sql = "SELECT users.id\nFROM users\nINNER JOIN charges ON users.id = charges.user_id\nINNER JOIN refunds ON refunds.charge_id = charges.id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("charges.id = refunds.charge_id"));
    }

    #[test]
    fn test_aliased_tables_match_by_binding() {
        let sql = "SELECT workers.id\nFROM employees AS workers\nINNER JOIN employees AS managers ON managers.id = workers.manager_id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_non_equality_left_alone() {
        let sql =
            "SELECT users.id\nFROM users\nINNER JOIN charges ON charges.created_at > users.created_at";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_comparison_against_literal_ignored() {
        let sql = "SELECT users.id\nFROM users\nINNER JOIN charges ON charges.user_id = 1";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_fix_swaps_sides() {
        let mut engine = StyleEngine::new(StyleConfig::default());
        engine.filter_rules(|code| code == rule_codes::STYLE_ST_002);
        let outcome = engine
            .format("SELECT users.id\nFROM users\nINNER JOIN charges ON charges.user_id = users.id")
            .unwrap();
        assert_eq!(
            outcome.text,
            "SELECT users.id\nFROM users\nINNER JOIN charges ON users.id = charges.user_id"
        );
    }
}
