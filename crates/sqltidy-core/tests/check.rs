//! Integration tests for check mode.
//!
//! These tests verify that violations flow through `StyleEngine::check()`
//! across whole batches: ordering, statement indices, suppression comments,
//! and the per-statement containment that keeps one broken statement from
//! hiding the rest.

use insta::assert_json_snapshot;
use rstest::rstest;
use sqltidy_core::{rule_codes, SchemaCatalog, Severity, StyleConfig, StyleEngine, Violation};

fn engine() -> StyleEngine {
    StyleEngine::new(StyleConfig::default())
}

fn check(sql: &str) -> Vec<Violation> {
    engine().check(sql).violations
}

fn codes(sql: &str) -> Vec<String> {
    check(sql).iter().map(|v| v.rule.clone()).collect()
}

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

// =============================================================================
// Canonical text comes back clean
// =============================================================================

#[test]
fn canonical_query_is_clean() {
    let sql = "SELECT\n    id,\n    email\nFROM users\nWHERE plan = 'paid'";
    let report = engine().check(sql);
    assert!(report.is_clean(), "unexpected: {:?}", report.violations);
}

#[test]
fn canonical_join_is_clean() {
    let sql = "SELECT\n    users.id,\n    charges.amount\nFROM users\nINNER JOIN charges ON users.id = charges.user_id";
    let report = engine().check(sql);
    assert!(report.is_clean(), "unexpected: {:?}", report.violations);
}

// =============================================================================
// Individual findings surface with positions
// =============================================================================

#[test]
fn lowercase_keyword_reported() {
    let violations = check("select 1");
    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.rule, rule_codes::STYLE_CP_001);
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.span.unwrap().start, 0);
    assert_eq!(v.suggested_fix.as_deref(), Some("SELECT"));
}

#[test]
fn report_serializes_for_tooling() {
    assert_json_snapshot!(check("select 1"), @r#"
    [
      {
        "severity": "warning",
        "rule": "STYLE_CP_001",
        "message": "Keyword 'select' should be upper case.",
        "span": {
          "start": 0,
          "end": 6
        },
        "statementIndex": 0,
        "suggestedFix": "SELECT"
      }
    ]
    "#);
}

#[test]
fn multi_column_inline_select_flagged() {
    let codes = codes("SELECT id, email, created_at FROM users");
    assert!(codes.contains(&rule_codes::STYLE_LT_001.to_string()));
}

#[rstest]
#[case::not_equal_operator("SELECT 1 FROM t WHERE a <> b", rule_codes::STYLE_CV_002)]
#[case::bare_join("SELECT 1 FROM a JOIN b ON a.id = b.a_id", rule_codes::STYLE_AM_001)]
#[case::short_cte_name("WITH t AS (SELECT 1)\nSELECT * FROM t", rule_codes::STYLE_ST_005)]
#[case::space_inside_parens("SELECT sum( amount ) AS total FROM charges", rule_codes::STYLE_LT_003)]
fn statement_triggers_rule(#[case] sql: &str, #[case] code: &str) {
    assert!(
        codes(sql).contains(&code.to_string()),
        "expected {code} for {sql:?}, got {:?}",
        codes(sql)
    );
}

#[test]
fn single_condition_on_where_line_allowed() {
    let codes = codes("SELECT *\nFROM users\nWHERE id = 1234");
    assert!(!codes.contains(&rule_codes::STYLE_LT_002.to_string()));
}

#[test]
fn reversed_join_direction_flagged() {
    let sql = "SELECT\n    users.id,\n    charges.amount\nFROM users\nINNER JOIN charges ON charges.user_id = users.id";
    let codes = codes(sql);
    assert!(codes.contains(&rule_codes::STYLE_ST_002.to_string()));
}

#[test]
fn one_line_case_flags_both_whens() {
    let sql = "SELECT\n    CASE WHEN x THEN 'a' WHEN y THEN 'b' END AS label\nFROM users";
    let count = check(sql)
        .iter()
        .filter(|v| v.rule == rule_codes::STYLE_LT_005)
        .count();
    assert_eq!(count, 2);
}

#[test]
fn cte_chain_not_ending_in_final_flagged() {
    let sql = "WITH paying AS (\n    SELECT id\n    FROM users\n),\nrecent AS (\n    SELECT id\n    FROM paying\n)\nSELECT *\nFROM recent";
    let messages: Vec<String> = check(sql)
        .iter()
        .filter(|v| v.rule == rule_codes::STYLE_ST_004)
        .map(|v| v.message.clone())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Name the last CTE 'final'.".to_string(),
            "End the statement with SELECT * FROM final.".to_string(),
        ]
    );
}

// =============================================================================
// Batches: indices, containment, ordering
// =============================================================================

#[test]
fn statement_indices_follow_source_order() {
    let violations = check("select 1;\nselect 2");
    let indices: Vec<_> = violations.iter().filter_map(|v| v.statement_index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn parse_error_confined_to_its_statement() {
    let violations = check("SELECT FROM;\nselect 1");
    assert!(violations
        .iter()
        .any(|v| v.rule == rule_codes::PARSE_ERROR && v.statement_index == Some(0)));
    assert!(violations
        .iter()
        .any(|v| v.rule == rule_codes::STYLE_CP_001 && v.statement_index == Some(1)));
}

#[test]
fn lex_error_is_error_severity() {
    let report = engine().check("SELECT 'unterminated");
    assert!(report.has_errors());
    assert_eq!(report.violations[0].rule, rule_codes::LEX_ERROR);
}

#[test]
fn violations_arrive_in_source_order() {
    let violations = check("select id, email from users where a = 1 and b = 2");
    let starts: Vec<usize> = violations
        .iter()
        .filter_map(|v| v.span.map(|s| s.start))
        .collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

// =============================================================================
// Suppression
// =============================================================================

#[test]
fn noqa_comment_suppresses_the_line() {
    let report = engine().check("select 1 -- noqa");
    assert!(report.violations.is_empty());
}

#[test]
fn scoped_noqa_suppresses_only_named_rules() {
    let violations = check("select id, email from users -- noqa: STYLE_LT_001");
    assert!(violations.iter().all(|v| v.rule != rule_codes::STYLE_LT_001));
    assert!(violations.iter().any(|v| v.rule == rule_codes::STYLE_CP_001));
}

// =============================================================================
// Catalog-backed rules
// =============================================================================

#[test]
fn column_order_needs_a_catalog() {
    let sql = "SELECT\n    email,\n    id\nFROM users";
    assert!(!codes(sql).contains(&rule_codes::STYLE_ST_001.to_string()));

    let engine = StyleEngine::new(StyleConfig::default()).with_catalog(catalog());
    let violations = engine.check(sql).violations;
    assert!(violations
        .iter()
        .any(|v| v.rule == rule_codes::STYLE_ST_001));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn disabled_rules_do_not_run() {
    let config = StyleConfig {
        disabled_rules: vec!["STYLE_CP_001".to_string()],
        ..StyleConfig::default()
    };
    let report = StyleEngine::new(config).check("select 1");
    assert!(report.violations.is_empty());
}

#[test]
fn lower_case_config_flags_upper_keywords() {
    let config = StyleConfig {
        keyword_case: sqltidy_core::KeywordCase::Lower,
        ..StyleConfig::default()
    };
    let violations = StyleEngine::new(config).check("SELECT 1").violations;
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].message,
        "Keyword 'SELECT' should be lower case."
    );
}
