//! STYLE_CV_001: Quote style.
//!
//! Strings take single quotes. A double-quoted token is an identifier as far
//! as the parser cares, so the rule looks for quoted identifiers sitting
//! where a value plainly belongs: one side of a comparison whose other side
//! is not itself quoted, or an element of an `IN (...)` list.

use crate::ast::{walk_expressions, walk_selects, Expression, Ident, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

pub struct StringQuotingRule;

impl StringQuotingRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for StringQuotingRule {
    fn default() -> Self {
        Self
    }
}

fn quoted_single_ident(expr: &Expression) -> Option<&Ident> {
    if let Expression::Column(col) = expr {
        if col.parts.len() == 1 && col.parts[0].quoted {
            return Some(&col.parts[0]);
        }
    }
    None
}

fn requote(ctx: &RuleContext<'_>, ident: &Ident) -> Violation {
    let span = ctx.abs(ident.span);
    let replacement = format!("'{}'", ident.name.replace('\'', "''"));
    Violation::warning(
        rule_codes::STYLE_CV_001,
        format!("Use single quotes for the string value '{}'.", ident.name),
    )
    .with_span(span)
    .with_fix(Fix::single(
        rule_codes::STYLE_CV_001,
        Edit::replace(span, replacement),
    ))
}

impl StyleRule for StringQuotingRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_CV_001
    }

    fn name(&self) -> &'static str {
        "string-quoting"
    }

    fn description(&self) -> &'static str {
        "String values use single quotes, not double."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            walk_expressions(select, &mut |expr| match expr {
                Expression::BinaryOp {
                    left, op, right, ..
                } if op.is_comparison() => {
                    // Two quoted identifiers compared to each other really
                    // are identifiers; leave those alone.
                    let lq = quoted_single_ident(left);
                    let rq = quoted_single_ident(right);
                    if let (Some(ident), None) = (rq, lq) {
                        violations.push(requote(ctx, ident));
                    }
                    if let (Some(ident), None) = (lq, rq) {
                        violations.push(requote(ctx, ident));
                    }
                }
                Expression::InList { items, .. } => {
                    for item in items {
                        if let Some(ident) = quoted_single_ident(item) {
                            violations.push(requote(ctx, ident));
                        }
                    }
                }
                _ => {}
            });
        });
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
        StringQuotingRule::default().check(&statement, &ctx).unwrap()
    }

    fn fix(sql: &str) -> String {
        let mut engine = StyleEngine::new(StyleConfig::default());
        engine.filter_rules(|code| code == rule_codes::STYLE_CV_001);
        engine.format(sql).unwrap().text
    }

    #[test]
    fn test_double_quoted_comparison_value_flagged() {
        let violations = check_sql(r#"SELECT * FROM users WHERE email = "a@b.com""#);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].suggested_fix.as_deref(), Some("'a@b.com'"));
    }

    #[test]
    fn test_fix_requotes() {
        assert_eq!(
            fix(r#"SELECT * FROM users WHERE plan IN ("free", 'pro')"#),
            "SELECT * FROM users WHERE plan IN ('free', 'pro')"
        );
    }

    #[test]
    fn test_quoted_identifier_in_projection_ok() {
        assert!(check_sql(r#"SELECT "odd name" FROM t"#).is_empty());
    }

    #[test]
    fn test_identifier_to_identifier_comparison_ok() {
        assert!(check_sql(r#"SELECT * FROM t WHERE "a" = "b""#).is_empty());
    }

    #[test]
    fn test_embedded_quote_doubled() {
        assert_eq!(
            fix(r#"SELECT * FROM t WHERE name = "O'Brien""#),
            "SELECT * FROM t WHERE name = 'O''Brien'"
        );
    }

    #[test]
    fn test_single_quotes_ok() {
        assert!(check_sql("SELECT * FROM t WHERE name = 'x'").is_empty());
    }
}
