//! STYLE_CV_002: Inequality operator.
//!
//! `!=` over `<>`. Both parse everywhere; the guide picks one.

use crate::ast::Statement;
use crate::config::StyleConfig;
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::tokens::TokenKind;
use crate::violation::{rule_codes, Violation};

pub struct NotEqualOperatorRule;

impl NotEqualOperatorRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for NotEqualOperatorRule {
    fn default() -> Self {
        Self
    }
}

impl StyleRule for NotEqualOperatorRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_CV_002
    }

    fn name(&self) -> &'static str {
        "not-equal-operator"
    }

    fn description(&self) -> &'static str {
        "Write inequality as != rather than <>."
    }

    fn check(
        &self,
        _statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for token in ctx.tokens {
            if token.kind == TokenKind::Operator && token.text == "<>" {
                let span = ctx.span(token.start, token.end);
                violations.push(
                    Violation::warning(rule_codes::STYLE_CV_002, "Use '!=' instead of '<>'.")
                        .with_span(span)
                        .with_fix(Fix::single(
                            rule_codes::STYLE_CV_002,
                            Edit::replace(span, "!="),
                        )),
                );
            }
        }
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
        NotEqualOperatorRule::default()
            .check(&statement, &ctx)
            .unwrap()
    }

    #[test]
    fn test_angle_operator_flagged() {
        let violations = check_sql("SELECT 1 FROM t WHERE a <> b");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].suggested_fix.as_deref(), Some("!="));
    }

    #[test]
    fn test_bang_equal_ok() {
        assert!(check_sql("SELECT 1 FROM t WHERE a != b").is_empty());
    }

    #[test]
    fn test_string_contents_ignored() {
        assert!(check_sql("SELECT '<>' FROM t").is_empty());
    }

    #[test]
    fn test_fix() {
        let mut engine = StyleEngine::new(StyleConfig::default());
        engine.filter_rules(|code| code == rule_codes::STYLE_CV_002);
        let outcome = engine.format("SELECT 1 FROM t WHERE a <> b AND c <> d").unwrap();
        assert_eq!(outcome.text, "SELECT 1 FROM t WHERE a != b AND c != d");
    }
}
