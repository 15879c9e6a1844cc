//! STYLE_ST_004: Subqueries in FROM move into CTEs, and CTE chains end in
//! a `final` CTE followed by a bare `SELECT * FROM final`.
//!
//! The closing select then shows the statement's shape at a glance, and
//! debugging means pointing it at an earlier CTE instead.

use crate::ast::{
    walk_selects, Expression, SelectStatement, Statement, TableExpression,
};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

#[derive(Default)]
pub struct CtePreferenceRule;

impl CtePreferenceRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

/// Exactly `SELECT * FROM final`, with nothing else hanging off it.
fn is_select_star_from_final(body: &SelectStatement) -> bool {
    if body.distinct || body.items.len() != 1 {
        return false;
    }
    if !matches!(
        body.items[0].expr,
        Expression::Wildcard { qualifier: None, .. }
    ) || body.items[0].alias.is_some()
    {
        return false;
    }
    let Some(from) = &body.from else {
        return false;
    };
    let TableExpression::Table(table) = &from.base else {
        return false;
    };
    if !table.name.base().matches("final") || table.alias.is_some() || !from.joins.is_empty() {
        return false;
    }
    body.where_clause.is_none()
        && body.group_by.is_none()
        && body.having.is_none()
        && body.order_by.is_none()
        && body.limit.is_none()
        && body.set_ops.is_empty()
}

impl StyleRule for CtePreferenceRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_ST_004
    }

    fn name(&self) -> &'static str {
        "cte-preference"
    }

    fn description(&self) -> &'static str {
        "FROM clauses reference tables or CTEs, and CTE chains end in 'final'."
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
            for table in
                std::iter::once(&from.base).chain(from.joins.iter().map(|j| &j.table))
            {
                if let TableExpression::Derived(derived) = table {
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_ST_004,
                            "Subquery in FROM belongs in a CTE.",
                        )
                        .with_span(ctx.abs(derived.span)),
                    );
                }
            }
        });
        if let Statement::With(block) = statement {
            if let Some(last) = block.ctes.last() {
                if !last.name.matches("final") {
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_ST_004,
                            "Name the last CTE 'final'.",
                        )
                        .with_span(ctx.abs(last.name.span)),
                    );
                }
            }
            if !is_select_star_from_final(&block.body) {
                violations.push(
                    Violation::warning(
                        rule_codes::STYLE_ST_004,
                        "End the statement with SELECT * FROM final.",
                    )
                    .with_span(ctx.abs(block.body.select_span)),
                );
            }
        }
        Ok(violations)
    }
}
