//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// sqltidy - SQL style checker and formatter
#[derive(Parser, Debug)]
#[command(name = "sqltidy")]
#[command(about = "Check and format SQL statements against the house style", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files to check (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Style configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Schema catalog file enabling the column-ordering rule (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Apply auto-fixes, rewriting files in place (stdin prints to stdout)
    #[arg(long)]
    pub fix: bool,

    /// Report format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Comma-separated rule codes to exclude (e.g. STYLE_CP_001,STYLE_LT_003)
    #[arg(long, value_delimiter = ',')]
    pub exclude_rules: Vec<String>,

    /// List the available rules and exit
    #[arg(long)]
    pub rules: bool,

    /// Suppress warnings and counters on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

/// Report renderer options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable PASS/FAIL report
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["sqltidy", "test.sql"]);
        assert_eq!(args.files.len(), 1);
        assert_eq!(args.format, ReportFormat::Text);
        assert!(args.config.is_none());
        assert!(args.schema.is_none());
        assert!(!args.fix);
        assert!(!args.rules);
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "sqltidy",
            "-c",
            "style.json",
            "-s",
            "catalog.json",
            "-f",
            "json",
            "-o",
            "report.json",
            "--quiet",
            "--compact",
            "file1.sql",
            "file2.sql",
        ]);
        assert_eq!(args.config.unwrap().to_str().unwrap(), "style.json");
        assert_eq!(args.schema.unwrap().to_str().unwrap(), "catalog.json");
        assert_eq!(args.format, ReportFormat::Json);
        assert_eq!(args.output.unwrap().to_str().unwrap(), "report.json");
        assert!(args.quiet);
        assert!(args.compact);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_fix_flag() {
        let args = Args::parse_from(["sqltidy", "--fix", "test.sql"]);
        assert!(args.fix);
        assert!(args.exclude_rules.is_empty());
    }

    #[test]
    fn test_exclude_rules() {
        let args = Args::parse_from([
            "sqltidy",
            "--exclude-rules",
            "STYLE_CP_001,STYLE_LT_003",
            "test.sql",
        ]);
        assert_eq!(args.exclude_rules, vec!["STYLE_CP_001", "STYLE_LT_003"]);
    }

    #[test]
    fn test_exclude_rules_repeated() {
        let args = Args::parse_from([
            "sqltidy",
            "--exclude-rules",
            "STYLE_CP_001",
            "--exclude-rules",
            "STYLE_LT_003",
            "test.sql",
        ]);
        assert_eq!(args.exclude_rules, vec!["STYLE_CP_001", "STYLE_LT_003"]);
    }

    #[test]
    fn test_rules_flag_needs_no_files() {
        let args = Args::parse_from(["sqltidy", "--rules"]);
        assert!(args.rules);
        assert!(args.files.is_empty());
    }
}
