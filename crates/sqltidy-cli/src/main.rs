//! sqltidy - SQL style checker and formatter

use sqltidy_cli::cli::{Args, ReportFormat};
use sqltidy_cli::fix;
use sqltidy_cli::input;
use sqltidy_cli::output;
use sqltidy_cli::rules_table;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use serde::de::DeserializeOwned;
use sqltidy_core::{SchemaCatalog, StyleConfig, StyleEngine};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

/// Style violations found or a runtime failure.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (bad config file, malformed catalog).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    let engine = match build_engine(&args) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("sqltidy: error: {e:#}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if args.rules {
        println!("{}", rules_table::format_rules_table(&engine));
        return ExitCode::SUCCESS;
    }

    match run(args, &engine) {
        Ok(has_violations) => {
            if has_violations {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqltidy: error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Build the engine from config file, exclusions, and optional catalog.
fn build_engine(args: &Args) -> Result<StyleEngine> {
    let mut config: StyleConfig = match &args.config {
        Some(path) => load_json(path).context("Failed to load style configuration")?,
        None => StyleConfig::default(),
    };
    config
        .disabled_rules
        .extend(args.exclude_rules.iter().cloned());

    let mut engine = StyleEngine::new(config);
    if let Some(path) = &args.schema {
        let catalog: SchemaCatalog = load_json(path).context("Failed to load schema catalog")?;
        engine = engine.with_catalog(catalog);
    }
    Ok(engine)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn run(args: Args, engine: &StyleEngine) -> Result<bool> {
    let started_at = Instant::now();
    let mut sources = input::read_sources(&args.files)?;
    let mut failed = false;

    if args.fix {
        let summary = fix::apply_fixes(engine, &mut sources)?;
        for failure in &summary.failures {
            eprintln!("sqltidy: error: {failure}");
            failed = true;
        }
        if !args.quiet {
            eprintln!(
                "sqltidy: applied fixes to {} of {} input(s)",
                summary.inputs_modified,
                sources.len()
            );
            if summary.statements_skipped > 0 {
                eprintln!(
                    "sqltidy: left {} statement(s) untouched due to lex/parse errors",
                    summary.statements_skipped
                );
            }
        }
    }

    let mut results = Vec::with_capacity(sources.len());
    for source in &sources {
        // Fixed stdin text already went to stdout; a report on top would
        // corrupt it.
        if args.fix && source.path.is_none() {
            continue;
        }

        let report = engine.check(&source.content);
        for failure in &report.rule_failures {
            if !args.quiet {
                eprintln!("sqltidy: warning: {}: {failure}", source.name);
            }
        }
        results.push(output::file_result(
            &source.name,
            &source.content,
            report.violations,
        ));
    }

    if results.is_empty() {
        return Ok(failed);
    }

    let has_violations = results.iter().any(|f| !f.rows.is_empty());
    let colored = args.output.is_none() && std::io::stdout().is_terminal();

    let report = match args.format {
        ReportFormat::Json => output::format_check_json(&results, args.compact),
        ReportFormat::Text => output::format_check_results(&results, colored, started_at.elapsed()),
    };
    output::write_output(&args.output, &report)?;

    Ok(failed || has_violations)
}
