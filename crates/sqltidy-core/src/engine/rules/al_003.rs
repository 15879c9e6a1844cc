//! STYLE_AL_003: `GROUP BY` repeats an expression the select list already
//! aliased. The alias is shorter and cannot drift out of sync, so the fix
//! swaps the repetition for it.

use std::collections::HashMap;

use crate::ast::{walk_selects, Expression, Statement};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::engine::rules::normalized_expr_text;
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

#[derive(Default)]
pub struct GroupByAliasRule;

impl GroupByAliasRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

impl StyleRule for GroupByAliasRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_AL_003
    }

    fn name(&self) -> &'static str {
        "group-by-alias"
    }

    fn description(&self) -> &'static str {
        "GROUP BY uses select-list aliases instead of repeating expressions."
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
            // Normalized expression text -> alias, for aliased items only.
            let mut aliased: HashMap<String, &str> = HashMap::new();
            for item in &select.items {
                if let Some(alias) = &item.alias {
                    aliased.insert(
                        normalized_expr_text(text, item.expr.span()),
                        alias.name.name.as_str(),
                    );
                }
            }
            if aliased.is_empty() {
                return;
            }
            for item in &group_by.items {
                // A lone column or ordinal is already as short as it gets.
                if matches!(item, Expression::NumberLiteral { .. }) {
                    continue;
                }
                if matches!(item, Expression::Column(c) if c.parts.len() == 1) {
                    continue;
                }
                let key = normalized_expr_text(text, item.span());
                if let Some(alias) = aliased.get(key.as_str()) {
                    let span = ctx.abs(item.span());
                    violations.push(
                        Violation::warning(
                            rule_codes::STYLE_AL_003,
                            format!(
                                "GROUP BY can use the alias '{alias}' instead of repeating the expression."
                            ),
                        )
                        .with_span(span)
                        .with_fix(Fix::single(
                            rule_codes::STYLE_AL_003,
                            Edit::replace(span, *alias),
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
        GroupByAliasRule.check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_repeated_expression_flagged() {
        let sql = "SELECT date_trunc('day', created_at) AS day, count(*) AS n FROM users GROUP BY date_trunc('day', created_at)";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "GROUP BY can use the alias 'day' instead of repeating the expression."
        );
        assert_eq!(violations[0].suggested_fix.as_deref(), Some("day"));
    }

    #[test]
    fn test_grouping_by_alias_ok() {
        let sql =
            "SELECT date_trunc('day', created_at) AS day, count(*) AS n FROM users GROUP BY day";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_plain_column_group_ok() {
        assert!(check_sql("SELECT plan, count(*) AS n FROM users GROUP BY plan").is_empty());
    }

    #[test]
    fn test_ordinal_group_key_ok() {
        let sql = "SELECT date_trunc('day', created_at) AS day, count(*) AS n FROM users GROUP BY 1";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_spacing_differences_still_match() {
        let sql = "SELECT date_trunc( 'day', created_at ) AS day FROM users GROUP BY date_trunc('day',created_at)";
        assert_eq!(check_sql(sql).len(), 1);
    }

    #[test]
    fn test_unaliased_expression_not_flagged() {
        let sql = "SELECT date_trunc('day', created_at) FROM users GROUP BY date_trunc('day', created_at)";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_fix_substitutes_alias() {
        let mut engine = StyleEngine::new(StyleConfig::default());
        engine.filter_rules(|code| code == rule_codes::STYLE_AL_003);
        let outcome = engine
            .format("SELECT lower(email) AS email_key FROM users GROUP BY lower(email)")
            .unwrap();
        assert_eq!(
            outcome.text,
            "SELECT lower(email) AS email_key FROM users GROUP BY email_key"
        );
    }
}
