//! STYLE_ST_001: Select-list order follows column roles.
//!
//! Primary keys first, then foreign keys, then the payload, with system
//! bookkeeping columns last. Needs a schema catalog to know which is
//! which; without one the rule stays silent.

use crate::ast::{walk_selects, Expression, SelectStatement, Statement};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::engine::rules::{table_scope, ScopeEntry};
use crate::error::RuleError;
use crate::schema::{ColumnCategory, SchemaCatalog};
use crate::violation::{rule_codes, Violation};

#[derive(Default)]
pub struct ColumnOrderRule;

impl ColumnOrderRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

/// Resolve a plain column item to the catalog table that owns it.
fn resolve<'a>(
    expr: &'a Expression,
    scope: &'a [ScopeEntry],
) -> Option<(&'a str, &'a str)> {
    let Expression::Column(col) = expr else {
        return None;
    };
    let column = col.parts.last()?.name.as_str();
    if col.parts.len() == 1 {
        let [only] = scope else { return None };
        if only.derived {
            return None;
        }
        return Some((only.name.as_str(), column));
    }
    let qualifier = &col.parts[col.parts.len() - 2].name;
    let entry = scope.iter().find(|e| e.matches(qualifier))?;
    if entry.derived {
        return None;
    }
    Some((entry.name.as_str(), column))
}

fn check_select(
    select: &SelectStatement,
    catalog: &SchemaCatalog,
    ctx: &RuleContext<'_>,
    violations: &mut Vec<Violation>,
) {
    let scope = table_scope(select);
    let mut latest: Option<ColumnCategory> = None;
    for item in &select.items {
        let Some((table, column)) = resolve(&item.expr, &scope) else {
            continue;
        };
        let Some(schema) = catalog.table(table) else {
            continue;
        };
        let Some(column_schema) = schema.column(column) else {
            continue;
        };
        let category = column_schema.category();
        if latest.is_some_and(|seen| category < seen) {
            violations.push(
                Violation::warning(
                    rule_codes::STYLE_ST_001,
                    format!(
                        "'{column}' is a {} column and should come earlier in the select list.",
                        category.label()
                    ),
                )
                .with_span(ctx.abs(item.span)),
            );
        }
        latest = Some(latest.map_or(category, |seen| seen.max(category)));
    }
}

impl StyleRule for ColumnOrderRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_ST_001
    }

    fn name(&self) -> &'static str {
        "column-order"
    }

    fn description(&self) -> &'static str {
        "Selected columns run primary key, foreign keys, regular, system."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let Some(catalog) = ctx.catalog else {
            return Ok(Vec::new());
        };
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            check_select(select, catalog, ctx, &mut violations);
        });
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::parser::parse;
    use crate::tokens::tokenize;

    fn catalog() -> SchemaCatalog {
        serde_json::from_str(
            r#"{
                "tables": [
                    {
                        "name": "users",
                        "columns": [
                            {"name": "id", "is_primary_key": true},
                            {"name": "account_id", "is_foreign_key": true},
                            {"name": "email"},
                            {"name": "created_at", "is_system_column": true}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    fn check_sql(sql: &str, catalog: Option<&SchemaCatalog>) -> Vec<Violation> {
        let tokens = tokenize(sql).unwrap();
        let statement = parse(&tokens).unwrap();
        let config = StyleConfig::default();
        let ctx = RuleContext {
            sql,
            statement_range: 0..sql.len(),
            statement_index: 0,
            tokens: &tokens,
            config: &config,
            catalog,
        };
        ColumnOrderRule.check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_key_after_regular_flagged() {
        let catalog = catalog();
        let violations = check_sql("SELECT email, id FROM users", Some(&catalog));
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "'id' is a primary key column and should come earlier in the select list."
        );
    }

    #[test]
    fn test_canonical_order_ok() {
        let catalog = catalog();
        let violations = check_sql(
            "SELECT id, account_id, email, created_at FROM users",
            Some(&catalog),
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_foreign_key_after_system_flagged() {
        let catalog = catalog();
        let violations = check_sql(
            "SELECT id, created_at, account_id FROM users",
            Some(&catalog),
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("foreign key"));
    }

    #[test]
    fn test_silent_without_catalog() {
        assert!(check_sql("SELECT email, id FROM users", None).is_empty());
    }

    #[test]
    fn test_unknown_columns_skipped() {
        let catalog = catalog();
        let violations = check_sql("SELECT nickname, id FROM users", Some(&catalog));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_qualified_references_resolve_through_alias() {
        let catalog = catalog();
        let sql = "SELECT holders.email, holders.id\nFROM users AS holders\nINNER JOIN users AS referrers ON holders.referrer_id = referrers.id";
        let violations = check_sql(sql, Some(&catalog));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'id'"));
    }
}
