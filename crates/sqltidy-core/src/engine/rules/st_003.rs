//! STYLE_ST_003: In a grouped query the grouping columns come first.
//!
//! `SELECT plan, count(*) ...` reads as "per plan, a count"; the reversed
//! order buries the thing being grouped by behind the measures.

use crate::ast::{walk_selects, Expression, SelectItem, SelectStatement, Statement};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::engine::rules::{contains_aggregate, normalized_expr_text};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

#[derive(Default)]
pub struct AggregatePlacementRule;

impl AggregatePlacementRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

fn single_ident(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Column(col) if col.parts.len() == 1 => {
            Some(col.parts[0].name.as_str())
        }
        _ => None,
    }
}

/// Does this select item correspond to one of the GROUP BY expressions?
fn is_grouped(
    item: &SelectItem,
    select: &SelectStatement,
    text: &str,
    group_texts: &[String],
) -> bool {
    let expr_text = normalized_expr_text(text, item.expr.span());
    if group_texts.iter().any(|g| *g == expr_text) {
        return true;
    }
    let mut names = Vec::new();
    if let Some(alias) = &item.alias {
        names.push(alias.name.name.as_str());
    }
    if let Expression::Column(col) = &item.expr {
        if let Some(last) = col.parts.last() {
            names.push(last.name.as_str());
        }
    }
    names.iter().any(|name| {
        select
            .group_by
            .iter()
            .flat_map(|g| g.items.iter())
            .filter_map(single_ident)
            .any(|g| g.eq_ignore_ascii_case(name))
    })
}

fn item_label<'a>(item: &'a SelectItem, ctx: &RuleContext<'a>) -> &'a str {
    if let Some(alias) = &item.alias {
        return alias.name.name.as_str();
    }
    if let Expression::Column(col) = &item.expr {
        if let Some(last) = col.parts.last() {
            return last.name.as_str();
        }
    }
    ctx.slice(item.expr.span())
}

impl StyleRule for AggregatePlacementRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_ST_003
    }

    fn name(&self) -> &'static str {
        "aggregate-placement"
    }

    fn description(&self) -> &'static str {
        "Grouping columns precede aggregates in the select list."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        let text = ctx.statement_text();
        walk_selects(statement, &mut |select| {
            let Some(group_by) = &select.group_by else {
                return;
            };
            let group_texts: Vec<String> = group_by
                .items
                .iter()
                .map(|item| normalized_expr_text(text, item.span()))
                .collect();
            let mut seen_aggregate = false;
            for item in &select.items {
                if is_grouped(item, select, text, &group_texts) {
                    if seen_aggregate {
                        violations.push(
                            Violation::warning(
                                rule_codes::STYLE_ST_003,
                                format!(
                                    "Grouping column '{}' belongs before the aggregates in the select list.",
                                    item_label(item, ctx)
                                ),
                            )
                            .with_span(ctx.abs(item.span)),
                        );
                    }
                } else if contains_aggregate(&item.expr) {
                    seen_aggregate = true;
                }
            }
        });
        Ok(violations)
    }
}
