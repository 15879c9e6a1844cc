//! STYLE_NM_001: Table naming.
//!
//! Tables are named in plural lower snake_case (`users`, `charges`). The
//! plural check is a suffix heuristic with an allowlist for common
//! irregular plurals. CTE references are covered by their own rule and
//! skipped here.

use crate::ast::{walk_selects, Statement, TableExpression};
use crate::config::StyleConfig;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

use super::{cte_names, is_snake_case};

/// Irregular plurals the suffix heuristic would reject.
const PLURAL_ALLOWLIST: &[&str] = &[
    "children", "criteria", "data", "media", "people", "series", "species", "staff",
];

pub struct TableNamingRule;

impl TableNamingRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for TableNamingRule {
    fn default() -> Self {
        Self
    }
}

fn looks_plural(name: &str) -> bool {
    name.ends_with('s') || PLURAL_ALLOWLIST.contains(&name)
}

impl StyleRule for TableNamingRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_NM_001
    }

    fn name(&self) -> &'static str {
        "table-naming"
    }

    fn description(&self) -> &'static str {
        "Table names are plural lower snake_case."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let ctes = cte_names(statement);
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let Some(from) = &select.from else {
                return;
            };
            let tables = std::iter::once(&from.base).chain(from.joins.iter().map(|j| &j.table));
            for table in tables {
                let TableExpression::Table(t) = table else {
                    continue;
                };
                let base = t.name.base();
                if ctes.iter().any(|c| base.matches(c)) {
                    continue;
                }
                if !is_snake_case(&base.name) {
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_NM_001,
                            format!("Table name '{}' should be lower snake_case.", base.name),
                        )
                        .with_span(ctx.abs(base.span)),
                    );
                } else if !looks_plural(&base.name) {
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_NM_001,
                            format!("Table name '{}' should be plural.", base.name),
                        )
                        .with_span(ctx.abs(base.span)),
                    );
                }
            }
        });
        Ok(violations)
    }
}
