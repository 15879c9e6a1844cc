//! STYLE_NM_002: Column naming.
//!
//! Output columns are lower snake_case. Aliases additionally carry semantic
//! suffixes and prefixes: a cast to `date` means the alias ends `_date`, a
//! cast to a timestamp type means `_at`, and a boolean-valued expression
//! means one of the configured boolean prefixes. The type checks are
//! heuristics driven by visible casts, nothing more.

use crate::ast::{
    walk_selects, Expression, SelectItem, Statement, UnaryOperator,
};
use crate::config::{NamingConventions, StyleConfig};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

use super::is_snake_case;

pub struct ColumnNamingRule {
    naming: NamingConventions,
}

impl ColumnNamingRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            naming: config.naming_conventions.clone(),
        }
    }

    fn check_item(&self, item: &SelectItem, ctx: &RuleContext<'_>) -> Option<Violation> {
        if let Some(alias) = &item.alias {
            let name = &alias.name.name;
            let span = ctx.abs(alias.name.span);
            if !is_snake_case(name) {
                return Some(
                    Violation::warning(
                        rule_codes::STYLE_NM_002,
                        format!("Column alias '{name}' should be lower snake_case."),
                    )
                    .with_span(span),
                );
            }
            match cast_target(&item.expr) {
                Some(t) if t.eq_ignore_ascii_case("date") => {
                    if !name.ends_with(&self.naming.date_suffix) {
                        return Some(
                            Violation::warning(
                                rule_codes::STYLE_NM_002,
                                format!(
                                    "Date column '{name}' should end with '{}'.",
                                    self.naming.date_suffix
                                ),
                            )
                            .with_span(span),
                        );
                    }
                }
                Some(t) if t.to_ascii_lowercase().starts_with("timestamp") => {
                    if !name.ends_with(&self.naming.timestamp_suffix) {
                        return Some(
                            Violation::warning(
                                rule_codes::STYLE_NM_002,
                                format!(
                                    "Timestamp column '{name}' should end with '{}'.",
                                    self.naming.timestamp_suffix
                                ),
                            )
                            .with_span(span),
                        );
                    }
                }
                _ => {
                    if is_boolean_expr(&item.expr) && !self.naming.has_boolean_prefix(name) {
                        return Some(
                            Violation::warning(
                                rule_codes::STYLE_NM_002,
                                format!(
                                    "Boolean column '{name}' should start with one of {}.",
                                    self.naming.boolean_prefixes.join("/")
                                ),
                            )
                            .with_span(span),
                        );
                    }
                }
            }
            return None;
        }

        // No alias: judge a plain column reference by its own name.
        if let Expression::Column(col) = &item.expr {
            let ident = col.parts.last()?;
            if !is_snake_case(&ident.name) {
                return Some(
                    Violation::warning(
                        rule_codes::STYLE_NM_002,
                        format!("Column name '{}' should be lower snake_case.", ident.name),
                    )
                    .with_span(ctx.abs(ident.span)),
                );
            }
        }
        None
    }
}

fn cast_target(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Cast { type_name, .. } => Some(&type_name.name),
        Expression::Grouped { inner, .. } => cast_target(inner),
        _ => None,
    }
}

fn is_boolean_expr(expr: &Expression) -> bool {
    match expr {
        Expression::BooleanLiteral { .. }
        | Expression::Exists { .. }
        | Expression::InList { .. }
        | Expression::InSubquery { .. }
        | Expression::Between { .. } => true,
        Expression::BinaryOp { op, .. } => op.is_comparison() || op.is_connective(),
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => true,
        Expression::Grouped { inner, .. } => is_boolean_expr(inner),
        _ => false,
    }
}

impl Default for ColumnNamingRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for ColumnNamingRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_NM_002
    }

    fn name(&self) -> &'static str {
        "column-naming"
    }

    fn description(&self) -> &'static str {
        "Column names are snake_case with boolean/date/timestamp affixes."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            for item in &select.items {
                violations.extend(self.check_item(item, ctx));
            }
        });
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
        ColumnNamingRule::default().check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_camel_case_alias_flagged() {
        let violations = check_sql("SELECT count(*) AS userCount FROM users");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("snake_case"));
    }

    #[test]
    fn test_date_cast_wants_date_suffix() {
        let violations = check_sql("SELECT created_at::date AS created_day FROM users");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Date column 'created_day' should end with '_date'."
        );
        assert!(check_sql("SELECT created_at::date AS created_date FROM users").is_empty());
    }

    #[test]
    fn test_timestamp_cast_wants_at_suffix() {
        let violations = check_sql("SELECT cast(created AS timestamp) AS created_time FROM users");
        assert_eq!(violations.len(), 1);
        assert!(check_sql("SELECT cast(created AS timestamp) AS created_at FROM users").is_empty());
    }

    #[test]
    fn test_boolean_expression_wants_prefix() {
        let violations = check_sql("SELECT (amount > 0) AS charged FROM charges");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("Boolean column 'charged'"));
        assert!(check_sql("SELECT (amount > 0) AS has_charge FROM charges").is_empty());
    }

    #[test]
    fn test_plain_snake_columns_ok() {
        assert!(check_sql("SELECT id, user_email FROM users").is_empty());
    }

    #[test]
    fn test_unaliased_camel_column_flagged() {
        let violations = check_sql("SELECT FirstName FROM users");
        assert_eq!(violations.len(), 1);
    }
}
