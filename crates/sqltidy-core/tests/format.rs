//! End-to-end format goldens.
//!
//! Each golden runs the full default rule set, so these double as
//! conflict-freedom checks: every rule's edits must land in one converging
//! pass sequence.

use sqltidy_core::{KeywordCase, StyleConfig, StyleEngine};

fn format(sql: &str) -> String {
    StyleEngine::new(StyleConfig::default())
        .format(sql)
        .unwrap()
        .text
}

/// Formatting a second time must be a no-op.
fn format_settled(sql: &str) -> String {
    let once = format(sql);
    let twice = format(&once);
    assert_eq!(once, twice, "format is not idempotent for {sql:?}");
    once
}

#[test]
fn golden_multi_column_select() {
    assert_eq!(
        format_settled("select id, email, created_at from users"),
        "SELECT\n    id,\n    email,\n    created_at\nFROM users"
    );
}

#[test]
fn golden_single_column_with_where() {
    assert_eq!(
        format_settled("select * from users where id = 1234"),
        "SELECT *\nFROM users\nWHERE id = 1234"
    );
}

#[test]
fn golden_multi_condition_where() {
    assert_eq!(
        format_settled("select id from users where id = 1 and plan = 'paid'"),
        "SELECT id\nFROM users\nWHERE\n    id = 1\n    AND plan = 'paid'"
    );
}

#[test]
fn golden_join_condition() {
    assert_eq!(
        format_settled("select users.id from users inner join charges on users.id = charges.user_id"),
        "SELECT users.id\nFROM users\nINNER JOIN charges ON users.id = charges.user_id"
    );
}

#[test]
fn golden_alias_gets_as() {
    assert_eq!(
        format_settled("SELECT count(*) n FROM users"),
        "SELECT count(*) AS n FROM users"
    );
}

#[test]
fn golden_bare_join_becomes_inner() {
    assert_eq!(
        format_settled("SELECT users.id\nFROM users\nJOIN charges ON users.id = charges.user_id"),
        "SELECT users.id\nFROM users\nINNER JOIN charges ON users.id = charges.user_id"
    );
}

#[test]
fn clean_text_is_returned_unchanged() {
    let sql = "SELECT\n    id,\n    email\nFROM users";
    let outcome = StyleEngine::new(StyleConfig::default()).format(sql).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.passes, 0);
    assert_eq!(outcome.text, sql);
}

#[test]
fn lower_case_configuration_respected() {
    let config = StyleConfig {
        keyword_case: KeywordCase::Lower,
        ..StyleConfig::default()
    };
    let outcome = StyleEngine::new(config).format("SELECT id FROM users").unwrap();
    assert_eq!(outcome.text, "select id from users");
}

#[test]
fn unparsable_statement_left_alone() {
    let sql = "select ))) from;\nselect 1";
    let outcome = StyleEngine::new(StyleConfig::default()).format(sql).unwrap();
    assert!(outcome.text.contains("select ))) from"));
    assert!(outcome.text.contains("SELECT 1"));
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn comments_survive_formatting() {
    let sql = "-- daily revenue\nselect id from users";
    assert_eq!(format_settled(sql), "-- daily revenue\nSELECT id FROM users");
}

#[test]
fn batch_formats_each_statement() {
    let formatted = format_settled("select 1;\nselect 2");
    assert_eq!(formatted, "SELECT 1;\nSELECT 2");
}
