//! STYLE_AL_001: Aliasing restraint for tables.
//!
//! A table used once reads better under its full name; aliases are for
//! self-joins, where they are mandatory and must be words a reader can
//! hold onto, not initials.

use crate::ast::{walk_selects, Statement, TableExpression};
use crate::config::StyleConfig;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

pub struct TableAliasRule {
    min_length: usize,
}

impl TableAliasRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            min_length: config.alias_min_length,
        }
    }
}

impl Default for TableAliasRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

/// First letters of the name's underscore-separated words, e.g.
/// `billing_accounts` -> `ba`.
fn initials(name: &str) -> String {
    name.split('_')
        .filter_map(|part| part.chars().next())
        .collect()
}

impl StyleRule for TableAliasRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_AL_001
    }

    fn name(&self) -> &'static str {
        "table-alias"
    }

    fn description(&self) -> &'static str {
        "Tables are aliased only for self-joins, and then meaningfully."
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
            let tables: Vec<&TableExpression> = std::iter::once(&from.base)
                .chain(from.joins.iter().map(|j| &j.table))
                .collect();
            for table in &tables {
                let TableExpression::Table(t) = table else {
                    continue;
                };
                let name = &t.name.base().name;
                let uses = tables
                    .iter()
                    .filter(|other| {
                        matches!(other, TableExpression::Table(o) if o.name.base().matches(name))
                    })
                    .count();
                match (&t.alias, uses > 1) {
                    (Some(alias), false) => {
                        violations.push(
                            Violation::warning(
                                rule_codes::STYLE_AL_001,
                                format!(
                                    "Table '{}' appears once; drop the alias '{}'.",
                                    name, alias.name.name
                                ),
                            )
                            .with_span(ctx.abs(alias.span)),
                        );
                    }
                    (None, true) => {
                        violations.push(
                            Violation::warning(
                                rule_codes::STYLE_AL_001,
                                format!("Self-joined table '{name}' needs an alias."),
                            )
                            .with_span(ctx.abs(t.span)),
                        );
                    }
                    (Some(alias), true) => {
                        let a = &alias.name.name;
                        if a.len() < self.min_length
                            || a.eq_ignore_ascii_case(&initials(name))
                        {
                            violations.push(
                                Violation::warning(
                                    rule_codes::STYLE_AL_001,
                                    format!(
                                        "Alias '{a}' for table '{name}' should be a meaningful word."
                                    ),
                                )
                                .with_span(ctx.abs(alias.span)),
                            );
                        }
                    }
                    (None, false) => {}
                }
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
        TableAliasRule::default().check(&statement, &ctx).unwrap()
    }

    #[test]
    fn test_unneeded_alias_flagged() {
        let violations = check_sql("SELECT u.id FROM users u");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Table 'users' appears once; drop the alias 'u'."
        );
    }

    #[test]
    fn test_unaliased_single_use_ok() {
        assert!(check_sql("SELECT id FROM users").is_empty());
    }

    #[test]
    fn test_self_join_with_good_aliases_ok() {
        let sql = "SELECT managers.id\nFROM employees AS workers\nINNER JOIN employees AS managers ON workers.manager_id = managers.id";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_self_join_without_alias_flagged() {
        let sql = "SELECT 1 FROM employees INNER JOIN employees ON employees.id = employees.manager_id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("needs an alias"));
    }

    #[test]
    fn test_short_alias_in_self_join_flagged() {
        let sql = "SELECT m.id\nFROM employees AS e\nINNER JOIN employees AS m ON e.manager_id = m.id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("meaningful word"));
    }

    #[test]
    fn test_initials_alias_flagged() {
        let sql = "SELECT bba.id\nFROM big_billing_accounts AS bba\nINNER JOIN big_billing_accounts AS owners ON bba.owner_id = owners.id";
        let violations = check_sql(sql);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'bba'"));
    }

    #[test]
    fn test_different_tables_with_aliases_each_flagged() {
        let sql = "SELECT u.id\nFROM users u\nINNER JOIN charges c ON u.id = c.user_id";
        assert_eq!(check_sql(sql).len(), 2);
    }
}
