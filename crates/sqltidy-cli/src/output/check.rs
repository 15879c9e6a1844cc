//! Check report formatting (sqlfluff-style).

use owo_colors::OwoColorize;
use sqltidy_core::{Severity, Violation};
use std::fmt::Write;
use std::time::Duration;

/// Per-file check result used by the formatters.
pub struct FileCheckResult {
    pub name: String,
    pub rows: Vec<ViolationRow>,
}

/// A violation resolved to line:col.
pub struct ViolationRow {
    pub line: usize,
    pub col: usize,
    pub rule: String,
    pub message: String,
    pub severity: Severity,
    pub suggested_fix: Option<String>,
}

/// Resolve a file's violations into report rows.
pub fn file_result(name: &str, content: &str, violations: Vec<Violation>) -> FileCheckResult {
    let rows = violations
        .into_iter()
        .map(|v| {
            let (line, col) = v
                .span
                .map(|s| offset_to_line_col(content, s.start))
                .unwrap_or((1, 1));
            ViolationRow {
                line,
                col,
                rule: v.rule,
                message: v.message,
                severity: v.severity,
                suggested_fix: v.suggested_fix,
            }
        })
        .collect();

    FileCheckResult {
        name: name.to_string(),
        rows,
    }
}

/// Convert a byte offset into a 1-based (line, col) pair.
pub fn offset_to_line_col(sql: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(sql.len());
    let mut line = 1usize;
    let mut col = 1usize;

    for (i, ch) in sql.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Format check results as human-readable sqlfluff-style text.
pub fn format_check_results(
    results: &[FileCheckResult],
    colored: bool,
    elapsed: Duration,
) -> String {
    let mut out = String::new();

    let mut total_pass = 0usize;
    let mut total_fail = 0usize;
    let mut total_violations = 0usize;

    for file in results {
        if file.rows.is_empty() {
            total_pass += 1;
        } else {
            total_fail += 1;
            total_violations += file.rows.len();
        }

        write_file_section(&mut out, file, colored);
    }

    write_summary(
        &mut out,
        total_pass,
        total_fail,
        total_violations,
        colored,
        elapsed,
    );

    out
}

fn write_file_section(out: &mut String, file: &FileCheckResult, colored: bool) {
    let status = if file.rows.is_empty() {
        if colored {
            "PASS".green().to_string()
        } else {
            "PASS".to_string()
        }
    } else if colored {
        "FAIL".red().to_string()
    } else {
        "FAIL".to_string()
    };

    writeln!(out, "== [{}] {}", file.name, status).unwrap();

    // Sort rows by line, then column
    let mut sorted: Vec<&ViolationRow> = file.rows.iter().collect();
    sorted.sort_by_key(|r| (r.line, r.col));

    for row in sorted {
        let code_str = if colored {
            match row.severity {
                Severity::Error => row.rule.red().to_string(),
                Severity::Warning => row.rule.yellow().to_string(),
                Severity::Info => row.rule.blue().to_string(),
            }
        } else {
            row.rule.clone()
        };

        writeln!(
            out,
            "L:{:>4} | P:{:>4} | {} | {}",
            row.line, row.col, code_str, row.message
        )
        .unwrap();
    }
}

fn write_summary(
    out: &mut String,
    pass: usize,
    fail: usize,
    violations: usize,
    colored: bool,
    elapsed: Duration,
) {
    writeln!(out, "All Finished in {}!", format_elapsed(elapsed)).unwrap();

    let summary = format!(
        "  {} passed. {} failed. {} violations found.",
        pass_str(pass, colored),
        fail_str(fail, colored),
        violations
    );
    writeln!(out, "{summary}").unwrap();
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if elapsed.as_millis() >= 1 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{}us", elapsed.as_micros())
    }
}

fn pass_str(count: usize, colored: bool) -> String {
    let s = format!("{count} file{}", if count == 1 { "" } else { "s" });
    if colored && count > 0 {
        s.green().to_string()
    } else {
        s
    }
}

fn fail_str(count: usize, colored: bool) -> String {
    let s = format!("{count} file{}", if count == 1 { "" } else { "s" });
    if colored && count > 0 {
        s.red().to_string()
    } else {
        s
    }
}

/// Format check results as JSON.
pub fn format_check_json(results: &[FileCheckResult], compact: bool) -> String {
    let json_results: Vec<serde_json::Value> = results
        .iter()
        .map(|file| {
            let violations: Vec<serde_json::Value> = file
                .rows
                .iter()
                .map(|row| {
                    let mut value = serde_json::json!({
                        "rule": row.rule,
                        "severity": match row.severity {
                            Severity::Error => "error",
                            Severity::Warning => "warning",
                            Severity::Info => "info",
                        },
                        "line": row.line,
                        "column": row.col,
                        "message": row.message,
                    });
                    if let Some(suggestion) = &row.suggested_fix {
                        value["suggested_fix"] = serde_json::json!(suggestion);
                    }
                    value
                })
                .collect();

            serde_json::json!({
                "file": file.name,
                "violations": violations
            })
        })
        .collect();

    if compact {
        serde_json::to_string(&json_results).unwrap_or_default()
    } else {
        serde_json::to_string_pretty(&json_results).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_col_start() {
        assert_eq!(offset_to_line_col("SELECT 1", 0), (1, 1));
    }

    #[test]
    fn test_offset_to_line_col_same_line() {
        assert_eq!(offset_to_line_col("SELECT 1", 7), (1, 8));
    }

    #[test]
    fn test_offset_to_line_col_second_line() {
        let sql = "SELECT 1\nFROM t";
        // offset 9 = 'F' on second line
        assert_eq!(offset_to_line_col(sql, 9), (2, 1));
    }

    #[test]
    fn test_offset_to_line_col_past_end() {
        let sql = "SELECT 1";
        assert_eq!(offset_to_line_col(sql, 100), (1, 9));
    }

    #[test]
    fn test_offset_to_line_col_utf8_chars() {
        let sql = "SELECT 'é' FROM t";
        let from_offset = sql.find("FROM").expect("FROM position");
        assert_eq!(offset_to_line_col(sql, from_offset), (1, 12));
    }

    #[test]
    fn test_format_check_pass() {
        let results = vec![FileCheckResult {
            name: "clean.sql".to_string(),
            rows: vec![],
        }];

        let output = format_check_results(&results, false, Duration::from_millis(250));
        assert!(output.contains("PASS"));
        assert!(output.contains("All Finished in 250ms!"));
        assert!(output.contains("clean.sql"));
        assert!(output.contains("1 file passed"));
        assert!(output.contains("0 files failed"));
        assert!(output.contains("0 violations"));
    }

    #[test]
    fn test_format_check_fail() {
        let results = vec![FileCheckResult {
            name: "bad.sql".to_string(),
            rows: vec![
                ViolationRow {
                    line: 3,
                    col: 12,
                    rule: "STYLE_CV_002".to_string(),
                    message: "Use != instead of <>.".to_string(),
                    severity: Severity::Warning,
                    suggested_fix: Some("!=".to_string()),
                },
                ViolationRow {
                    line: 7,
                    col: 1,
                    rule: "STYLE_ST_005".to_string(),
                    message: "CTE name 'tmp' is too short to be meaningful.".to_string(),
                    severity: Severity::Warning,
                    suggested_fix: None,
                },
            ],
        }];

        let output = format_check_results(&results, false, Duration::from_secs_f64(1.5));
        assert!(output.contains("FAIL"));
        assert!(output.contains("All Finished in 1.50s!"));
        assert!(output.contains("bad.sql"));
        assert!(output.contains("STYLE_CV_002"));
        assert!(output.contains("STYLE_ST_005"));
        assert!(output.contains("L:   3 | P:  12"));
        assert!(output.contains("L:   7 | P:   1"));
        assert!(output.contains("2 violations"));
    }

    #[test]
    fn test_summary_formatting() {
        let results = vec![
            FileCheckResult {
                name: "a.sql".to_string(),
                rows: vec![],
            },
            FileCheckResult {
                name: "b.sql".to_string(),
                rows: vec![ViolationRow {
                    line: 1,
                    col: 1,
                    rule: "STYLE_CP_001".to_string(),
                    message: "test".to_string(),
                    severity: Severity::Warning,
                    suggested_fix: None,
                }],
            },
        ];

        let output = format_check_results(&results, false, Duration::from_micros(700));
        assert!(output.contains("All Finished in 700us!"));
        assert!(output.contains("1 file passed"));
        assert!(output.contains("1 file failed"));
        assert!(output.contains("1 violations"));
    }

    #[test]
    fn test_format_check_json() {
        let results = vec![FileCheckResult {
            name: "test.sql".to_string(),
            rows: vec![ViolationRow {
                line: 1,
                col: 8,
                rule: "STYLE_CV_002".to_string(),
                message: "Use != instead of <>.".to_string(),
                severity: Severity::Warning,
                suggested_fix: Some("!=".to_string()),
            }],
        }];

        let json = format_check_json(&results, false);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["file"], "test.sql");
        assert_eq!(arr[0]["violations"][0]["rule"], "STYLE_CV_002");
        assert_eq!(arr[0]["violations"][0]["severity"], "warning");
        assert_eq!(arr[0]["violations"][0]["line"], 1);
        assert_eq!(arr[0]["violations"][0]["column"], 8);
        assert_eq!(arr[0]["violations"][0]["suggested_fix"], "!=");
    }

    #[test]
    fn test_json_omits_missing_suggestion() {
        let results = vec![FileCheckResult {
            name: "test.sql".to_string(),
            rows: vec![ViolationRow {
                line: 1,
                col: 1,
                rule: "STYLE_AL_001".to_string(),
                message: "test".to_string(),
                severity: Severity::Warning,
                suggested_fix: None,
            }],
        }];

        let json = format_check_json(&results, true);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed[0]["violations"][0].get("suggested_fix").is_none());
    }

    #[test]
    fn test_file_result_resolves_spans() {
        use sqltidy_core::{Span, Violation};

        let sql = "select 1\nfrom t";
        let violations = vec![Violation::warning("STYLE_CP_001", "Keyword not uppercase.")
            .with_span(Span::new(9, 13))];
        let result = file_result("x.sql", sql, violations);
        assert_eq!(result.rows.len(), 1);
        assert_eq!((result.rows[0].line, result.rows[0].col), (2, 1));
    }
}
