//! STYLE_AM_002: GROUP BY consistency.
//!
//! Grouping keys are either all column names or all ordinal positions.
//! A mixed list makes the grouping set hard to read off the query.

use crate::ast::{walk_selects, Expression, Statement};
use crate::config::StyleConfig;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

pub struct GroupByStyleRule;

impl GroupByStyleRule {
    pub fn from_config(_config: &StyleConfig) -> Self {
        Self
    }
}

impl Default for GroupByStyleRule {
    fn default() -> Self {
        Self
    }
}

impl StyleRule for GroupByStyleRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_AM_002
    }

    fn name(&self) -> &'static str {
        "group-by-style"
    }

    fn description(&self) -> &'static str {
        "GROUP BY keys are all names or all ordinals, never mixed."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let Some(group_by) = &select.group_by else {
                return;
            };
            let ordinals = group_by
                .items
                .iter()
                .filter(|item| matches!(item, Expression::NumberLiteral { .. }))
                .count();
            if ordinals > 0 && ordinals < group_by.items.len() {
                violations.push(
                    Violation::warning(
                        rule_codes::STYLE_AM_002,
                        "GROUP BY mixes column names and ordinal positions.",
                    )
                    .with_span(ctx.abs(group_by.keyword_span)),
                );
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
        GroupByStyleRule::default().check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_mixed_keys_flagged() {
        let violations =
            check_sql("SELECT plan, status, count(*) FROM users GROUP BY plan, 2");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "GROUP BY mixes column names and ordinal positions."
        );
    }

    #[test]
    fn test_all_names_ok() {
        assert!(check_sql("SELECT plan, status, count(*) FROM users GROUP BY plan, status")
            .is_empty());
    }

    #[test]
    fn test_all_ordinals_ok() {
        assert!(check_sql("SELECT plan, status, count(*) FROM users GROUP BY 1, 2").is_empty());
    }

    #[test]
    fn test_no_group_by_ok() {
        assert!(check_sql("SELECT count(*) FROM users").is_empty());
    }
}
