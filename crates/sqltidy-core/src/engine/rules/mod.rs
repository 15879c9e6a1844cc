//! The built-in rule set.
//!
//! One module per rule, named by code. Construction goes through
//! [`all_rules`], which reads the configuration both for per-rule knobs and
//! for which rules to leave out.

mod al_001;
mod al_002;
mod al_003;
mod am_001;
mod am_002;
mod cp_001;
mod cv_001;
mod cv_002;
mod cv_003;
mod layout;
mod lt_001;
mod lt_002;
mod lt_003;
mod lt_004;
mod lt_005;
mod nm_001;
mod nm_002;
mod rf_001;
mod st_001;
mod st_002;
mod st_003;
mod st_004;
mod st_005;

pub use al_001::TableAliasRule;
pub use al_002::ColumnAliasRule;
pub use al_003::GroupByAliasRule;
pub use am_001::ExplicitJoinRule;
pub use am_002::GroupByStyleRule;
pub use cp_001::KeywordCaseRule;
pub use cv_001::StringQuotingRule;
pub use cv_002::NotEqualOperatorRule;
pub use cv_003::ExplicitBooleanRule;
pub use lt_001::SelectLayoutRule;
pub use lt_002::WhereLayoutRule;
pub use lt_003::ParenSpacingRule;
pub use lt_004::OnConditionLayoutRule;
pub use lt_005::CaseLayoutRule;
pub use nm_001::TableNamingRule;
pub use nm_002::ColumnNamingRule;
pub use rf_001::ColumnQualificationRule;
pub use st_001::ColumnOrderRule;
pub use st_002::JoinDirectionRule;
pub use st_003::AggregatePlacementRule;
pub use st_004::CtePreferenceRule;
pub use st_005::CteNamingRule;

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::{
    Expression, FunctionCall, SelectStatement, Statement, TableExpression,
};
use crate::config::StyleConfig;
use crate::engine::rule::StyleRule;

/// Every rule the configuration enables, ready to run.
pub(crate) fn all_rules(config: &StyleConfig) -> Vec<Box<dyn StyleRule>> {
    let rules: Vec<Box<dyn StyleRule>> = vec![
        Box::new(TableAliasRule::from_config(config)),
        Box::new(ColumnAliasRule::from_config(config)),
        Box::new(GroupByAliasRule::from_config(config)),
        Box::new(ExplicitJoinRule::from_config(config)),
        Box::new(GroupByStyleRule::from_config(config)),
        Box::new(KeywordCaseRule::from_config(config)),
        Box::new(StringQuotingRule::from_config(config)),
        Box::new(NotEqualOperatorRule::from_config(config)),
        Box::new(ExplicitBooleanRule::from_config(config)),
        Box::new(SelectLayoutRule::from_config(config)),
        Box::new(WhereLayoutRule::from_config(config)),
        Box::new(ParenSpacingRule::from_config(config)),
        Box::new(OnConditionLayoutRule::from_config(config)),
        Box::new(CaseLayoutRule::from_config(config)),
        Box::new(TableNamingRule::from_config(config)),
        Box::new(ColumnNamingRule::from_config(config)),
        Box::new(ColumnQualificationRule::from_config(config)),
        Box::new(ColumnOrderRule::from_config(config)),
        Box::new(JoinDirectionRule::from_config(config)),
        Box::new(AggregatePlacementRule::from_config(config)),
        Box::new(CtePreferenceRule::from_config(config)),
        Box::new(CteNamingRule::from_config(config)),
    ];
    rules
        .into_iter()
        .filter(|r| config.is_rule_enabled(r.code()))
        .collect()
}

/// One table visible in a select's `FROM`/`JOIN` list.
#[derive(Debug, Clone)]
pub(crate) struct ScopeEntry {
    /// Unqualified table name, lowercased. Empty for an unaliased derived
    /// table.
    pub name: String,
    pub alias: Option<String>,
    pub derived: bool,
}

impl ScopeEntry {
    /// The name column qualifiers bind to: the alias when present, else the
    /// table name.
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn matches(&self, ident: &str) -> bool {
        !self.binding().is_empty() && self.binding().eq_ignore_ascii_case(ident)
    }
}

/// The tables in scope for one select, in source order (base table first).
pub(crate) fn table_scope(select: &SelectStatement) -> Vec<ScopeEntry> {
    let mut entries = Vec::new();
    if let Some(from) = &select.from {
        push_scope_entry(&mut entries, &from.base);
        for join in &from.joins {
            push_scope_entry(&mut entries, &join.table);
        }
    }
    entries
}

fn push_scope_entry(entries: &mut Vec<ScopeEntry>, table: &TableExpression) {
    let alias = table
        .alias()
        .map(|a| a.name.name.to_ascii_lowercase());
    match table {
        TableExpression::Table(t) => entries.push(ScopeEntry {
            name: t.name.base().name.to_ascii_lowercase(),
            alias,
            derived: false,
        }),
        TableExpression::Derived(_) => entries.push(ScopeEntry {
            name: alias.clone().unwrap_or_default(),
            alias,
            derived: true,
        }),
    }
}

/// Names of the statement's CTEs, lowercased.
pub(crate) fn cte_names(statement: &Statement) -> Vec<String> {
    match statement {
        Statement::With(block) => block
            .ctes
            .iter()
            .map(|cte| cte.name.name.to_ascii_lowercase())
            .collect(),
        Statement::Select(_) => Vec::new(),
    }
}

/// Aggregate functions recognized by the placement and aliasing rules.
pub(crate) const AGGREGATE_FUNCTIONS: &[&str] = &[
    "array_agg",
    "avg",
    "bool_and",
    "bool_or",
    "count",
    "every",
    "json_agg",
    "jsonb_agg",
    "max",
    "min",
    "string_agg",
    "sum",
];

pub(crate) fn is_aggregate_call(call: &FunctionCall) -> bool {
    // A window function aggregates per frame, not per group.
    call.over.is_none()
        && AGGREGATE_FUNCTIONS
            .iter()
            .any(|name| call.name.matches(name))
}

/// True when `expr` contains an aggregate call outside a window.
pub(crate) fn contains_aggregate(expr: &Expression) -> bool {
    let mut found = false;
    crate::ast::walk_expr_tree(expr, &mut |e| {
        if let Expression::Function(call) = e {
            if is_aggregate_call(call) {
                found = true;
            }
        }
    });
    found
}

pub(crate) fn is_snake_case(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static pattern"))
        .is_match(name)
}

/// Source text of a statement-relative span, lowercased with whitespace
/// removed, for loose expression comparison.
pub(crate) fn normalized_expr_text(statement_text: &str, span: crate::violation::Span) -> String {
    statement_text[span.start..span.end]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_honors_disabled_list() {
        let full = all_rules(&StyleConfig::default());
        let config = StyleConfig {
            disabled_rules: vec!["STYLE_CP_001".to_string()],
            ..StyleConfig::default()
        };
        let trimmed = all_rules(&config);
        assert_eq!(trimmed.len(), full.len() - 1);
        assert!(trimmed.iter().all(|r| r.code() != "STYLE_CP_001"));
    }

    #[test]
    fn test_rule_codes_are_unique() {
        let rules = all_rules(&StyleConfig::default());
        let mut codes: Vec<_> = rules.iter().map(|r| r.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), rules.len());
    }

    #[test]
    fn test_snake_case() {
        assert!(is_snake_case("user_id"));
        assert!(is_snake_case("a1_b2"));
        assert!(!is_snake_case("UserId"));
        assert!(!is_snake_case("_hidden"));
        assert!(!is_snake_case("émail"));
    }

    #[test]
    fn test_normalized_expr_text() {
        let text = "GROUP BY date_trunc( 'day' , created_at )";
        let span = crate::violation::Span::new(9, text.len());
        assert_eq!(
            normalized_expr_text(text, span),
            "date_trunc('day',created_at)"
        );
    }
}
