//! STYLE_RF_001: Column qualification.
//!
//! With two or more tables in scope every column reference carries its
//! table (or alias); with exactly one table, qualifiers are noise and get
//! stripped. References that name a select-list alias are exempt, as are
//! qualifiers that do not match the single in-scope table, since those are
//! correlated references to an outer query.

use std::collections::HashSet;

use crate::ast::{walk_expressions, walk_selects, Expression, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Span, Violation};

use super::table_scope;

pub struct ColumnQualificationRule;

impl ColumnQualificationRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for ColumnQualificationRule {
    fn default() -> Self {
        Self
    }
}

impl StyleRule for ColumnQualificationRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_RF_001
    }

    fn name(&self) -> &'static str {
        "column-qualification"
    }

    fn description(&self) -> &'static str {
        "Columns are qualified when several tables are in scope, bare otherwise."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let scope = table_scope(select);
            if scope.is_empty() {
                return;
            }
            let aliases: HashSet<String> = select
                .items
                .iter()
                .filter_map(|item| item.alias.as_ref())
                .map(|alias| alias.name.name.to_ascii_lowercase())
                .collect();

            walk_expressions(select, &mut |expr| {
                let Expression::Column(col) = expr else {
                    return;
                };
                if scope.len() >= 2 && col.parts.len() == 1 {
                    let name = &col.parts[0].name;
                    if aliases.contains(&name.to_ascii_lowercase()) {
                        return;
                    }
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_RF_001,
                            format!(
                                "Qualify '{name}' with its table; {} tables are in scope.",
                                scope.len()
                            ),
                        )
                        .with_span(ctx.abs(col.span)),
                    );
                } else if scope.len() == 1 && col.parts.len() >= 2 {
                    let qualifier = &col.parts[col.parts.len() - 2];
                    if !scope[0].matches(&qualifier.name) {
                        return;
                    }
                    let column = col
                        .parts
                        .last()
                        .expect("column reference has at least one part");
                    let prefix = ctx.abs(Span::new(col.span.start, column.span.start));
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_RF_001,
                            format!(
                                "Drop the qualifier on '{}'; only one table is in scope.",
                                column.name
                            ),
                        )
                        .with_span(ctx.abs(col.span))
                        .with_fix(Fix::single(rule_codes::STYLE_RF_001, Edit::delete(prefix))),
                    );
                }
            });
        });
        Ok(violations)
    }
}
