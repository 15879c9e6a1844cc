//! The style engine: statement batching, rule dispatch, suppression, and
//! the fix loop behind format mode.

pub mod fix;
pub mod rule;
pub mod rules;
pub(crate) mod suppress;

use crate::config::StyleConfig;
use crate::error::{ConflictError, LexError, RuleError};
use crate::parser;
use crate::schema::SchemaCatalog;
use crate::tokens::{split_statements, tokenize};
use crate::violation::{rule_codes, Severity, Span, Violation};

use self::fix::FIX_PASS_LIMIT;
use self::rule::{RuleContext, StyleRule};
use self::suppress::{line_of_offset, SuppressMap};

/// Result of checking a source text.
#[derive(Debug)]
pub struct CheckReport {
    /// All findings, normalized (sorted and deduplicated) and with
    /// suppressed entries already removed.
    pub violations: Vec<Violation>,
    /// Rules that failed while checking; the run continued without them.
    pub rule_failures: Vec<RuleError>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.rule_failures.is_empty()
    }

    /// True when any violation is an error (lex or parse failure).
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }
}

/// Result of formatting a source text.
#[derive(Debug)]
pub struct FormatOutcome {
    /// The reformatted text. Equal to the input when nothing applied.
    pub text: String,
    pub changed: bool,
    /// Number of edit passes applied before the text came back clean.
    pub passes: usize,
    /// Statements left untouched because they did not tokenize or parse.
    pub skipped: Vec<SkippedStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStatement {
    pub statement_index: usize,
    pub reason: String,
}

/// Checks and formats SQL batches against a fixed rule set.
pub struct StyleEngine {
    rules: Vec<Box<dyn StyleRule>>,
    config: StyleConfig,
    catalog: Option<SchemaCatalog>,
}

impl StyleEngine {
    /// Build an engine with every rule the configuration enables.
    pub fn new(config: StyleConfig) -> Self {
        let rules = rules::all_rules(&config);
        Self {
            rules,
            config,
            catalog: None,
        }
    }

    /// Attach a schema catalog, enabling the catalog-backed rules.
    pub fn with_catalog(mut self, catalog: SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Drop every rule whose code fails `keep`.
    pub fn filter_rules(&mut self, keep: impl Fn(&str) -> bool) {
        self.rules.retain(|r| keep(r.code()));
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn StyleRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Check every statement in `sql` and report violations.
    ///
    /// Statements that fail to tokenize or parse produce a single
    /// error-severity violation each and do not stop the rest of the batch.
    pub fn check(&self, sql: &str) -> CheckReport {
        let suppressions = SuppressMap::scan(sql);
        let mut violations = Vec::new();
        let mut rule_failures = Vec::new();
        let mut statement_index = 0usize;

        for range in split_statements(sql) {
            let segment = &sql[range.clone()];
            let tokens = match tokenize(segment) {
                Ok(tokens) => tokens,
                Err(err) => {
                    violations.push(lex_violation(&err, range.start, range.end, statement_index));
                    statement_index += 1;
                    continue;
                }
            };
            if tokens.iter().all(|t| t.is_trivia()) {
                // Blank segment: nothing to check, no statement slot used.
                continue;
            }
            let statement = match parser::parse(&tokens) {
                Ok(statement) => statement,
                Err(err) => {
                    let at = range.start + err.position.offset;
                    violations.push(
                        Violation::error(
                            rule_codes::PARSE_ERROR,
                            format!("Expected {}, found {}.", err.expected, err.found),
                        )
                        .with_span(Span::new(at, at))
                        .with_statement(statement_index),
                    );
                    statement_index += 1;
                    continue;
                }
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(statement_index, rules = self.rules.len(), "checking statement");

            let ctx = RuleContext {
                sql,
                statement_range: range.clone(),
                statement_index,
                tokens: &tokens,
                config: &self.config,
                catalog: self.catalog.as_ref(),
            };
            for rule in &self.rules {
                match rule.check(&statement, &ctx) {
                    Ok(found) => violations.extend(
                        found
                            .into_iter()
                            .map(|v| v.with_statement(statement_index)),
                    ),
                    Err(err) => rule_failures.push(err),
                }
            }
            statement_index += 1;
        }

        normalize_violations(&mut violations);
        if !suppressions.is_empty() {
            violations.retain(|v| match v.span {
                Some(span) => {
                    !suppressions.is_suppressed(line_of_offset(sql, span.start), &v.rule)
                }
                None => true,
            });
        }
        CheckReport {
            violations,
            rule_failures,
        }
    }

    /// Apply auto-fixes until a check pass comes back clean.
    ///
    /// Each pass re-checks the current text, so edits from one pass can
    /// unlock or re-aim edits in the next. The clean final pass doubles as
    /// the verification that formatting is idempotent. Overlapping fixes or
    /// a rule set that never settles abort with a [`ConflictError`].
    pub fn format(&self, sql: &str) -> Result<FormatOutcome, ConflictError> {
        let mut text = sql.to_string();
        let mut passes = 0usize;
        loop {
            let report = self.check(&text);
            let plan = fix::plan_edits(&report.violations)?;
            if plan.is_empty() {
                let skipped = report
                    .violations
                    .iter()
                    .filter(|v| v.severity == Severity::Error)
                    .map(|v| SkippedStatement {
                        statement_index: v.statement_index.unwrap_or(0),
                        reason: v.message.clone(),
                    })
                    .collect();
                return Ok(FormatOutcome {
                    changed: text != sql,
                    text,
                    passes,
                    skipped,
                });
            }
            if passes >= FIX_PASS_LIMIT {
                let mut rules: Vec<String> = plan.into_iter().map(|p| p.rule).collect();
                rules.sort();
                rules.dedup();
                return Err(ConflictError::Unstable { rules, passes });
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(pass = passes + 1, edits = plan.len(), "applying fix pass");

            text = fix::apply_edits(&text, &plan);
            passes += 1;
        }
    }
}

fn lex_violation(err: &LexError, range_start: usize, range_end: usize, index: usize) -> Violation {
    let (message, offset) = match err {
        LexError::UnterminatedString { quote, position } => (
            format!("Unterminated {quote}-quoted literal."),
            position.offset,
        ),
        LexError::UnterminatedBlockComment { position } => {
            ("Unterminated block comment.".to_string(), position.offset)
        }
    };
    Violation::error(rule_codes::LEX_ERROR, message)
        .with_span(Span::new(range_start + offset, range_end))
        .with_statement(index)
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}

/// Sort findings into reading order and drop exact duplicates.
pub(crate) fn normalize_violations(violations: &mut Vec<Violation>) {
    violations.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    violations.dedup_by(|a, b| {
        a.rule == b.rule
            && a.span == b.span
            && a.message == b.message
            && a.statement_index == b.statement_index
            && a.severity == b.severity
    });
}

fn sort_key(v: &Violation) -> (usize, usize, usize, u8, &str, &str) {
    (
        v.statement_index.unwrap_or(usize::MAX),
        v.span.map(|s| s.start).unwrap_or(usize::MAX),
        v.span.map(|s| s.end).unwrap_or(usize::MAX),
        severity_rank(v.severity),
        v.rule.as_str(),
        v.message.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> StyleEngine {
        StyleEngine::new(StyleConfig::default())
    }

    #[test]
    fn test_check_reports_keyword_case() {
        let report = engine().check("select 1");
        assert!(report
            .violations
            .iter()
            .any(|v| v.rule == rule_codes::STYLE_CP_001));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_blank_segments_use_no_statement_slot() {
        let report = engine().check("select 1;\n \n;select 2");
        let indices: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.rule == rule_codes::STYLE_CP_001)
            .filter_map(|v| v.statement_index)
            .collect();
        assert!(indices.contains(&0));
        assert!(indices.contains(&1));
        assert!(!indices.contains(&2));
    }

    #[test]
    fn test_lex_error_becomes_error_violation() {
        let report = engine().check("SELECT 'oops");
        assert!(report.has_errors());
        let v = &report.violations[0];
        assert_eq!(v.rule, rule_codes::LEX_ERROR);
        assert_eq!(v.severity, Severity::Error);
        assert_eq!(v.span.unwrap().start, 7);
    }

    #[test]
    fn test_parse_error_does_not_stop_the_batch() {
        let report = engine().check("SELECT FROM t;\nSELECT count(*) cnt FROM t GROUP BY 1");
        assert!(report
            .violations
            .iter()
            .any(|v| v.rule == rule_codes::PARSE_ERROR && v.statement_index == Some(0)));
        // The second statement still got rule coverage.
        assert!(report
            .violations
            .iter()
            .any(|v| v.statement_index == Some(1)));
    }

    #[test]
    fn test_noqa_suppresses_matching_line() {
        let clean = engine().check("select 1 -- noqa");
        assert!(clean.violations.is_empty());

        let scoped = engine().check("select 1 -- noqa: STYLE_LT_001");
        assert!(scoped
            .violations
            .iter()
            .any(|v| v.rule == rule_codes::STYLE_CP_001));
    }

    #[test]
    fn test_violations_are_sorted_and_deduped() {
        let report = engine().check("select a from t where xardvark = 1");
        let mut sorted = report.violations.clone();
        normalize_violations(&mut sorted);
        assert_eq!(sorted.len(), report.violations.len());
        for pair in report.violations.windows(2) {
            assert!(sort_key(&pair[0]) <= sort_key(&pair[1]));
        }
    }

    #[test]
    fn test_format_upcases_keywords() {
        let outcome = engine().format("select 1").unwrap();
        assert_eq!(outcome.text, "SELECT 1");
        assert!(outcome.changed);
        assert!(outcome.passes >= 1);
    }

    #[test]
    fn test_format_on_clean_text_is_a_noop() {
        let outcome = engine().format("SELECT 1").unwrap();
        assert_eq!(outcome.text, "SELECT 1");
        assert!(!outcome.changed);
        assert_eq!(outcome.passes, 0);
    }

    #[test]
    fn test_format_skips_unparsable_statements() {
        let outcome = engine().format("SELECT 'oops; SELECT 1").unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.text, "SELECT 'oops; SELECT 1");
    }

    #[test]
    fn test_filter_rules() {
        let mut engine = engine();
        engine.filter_rules(|code| code == rule_codes::STYLE_CP_001);
        assert_eq!(engine.rules().count(), 1);
    }
}
