//! The `--fix` driver.
//!
//! Formats each input through the engine's fix loop. Files are rewritten in
//! place; stdin input prints its fixed text to stdout instead. A conflict in
//! one file does not stop the rest of the batch.

use anyhow::{Context, Result};
use sqltidy_core::{ConflictError, StyleEngine};
use std::fs;
use std::io::{self, Write};
use thiserror::Error;

use crate::input::SourceFile;

/// A file whose fixes could not be applied.
#[derive(Debug, Error)]
#[error("unable to auto-fix {name}: {source}")]
pub struct FixFailure {
    pub name: String,
    #[source]
    pub source: ConflictError,
}

/// What a fix run did across the batch.
#[derive(Debug, Default)]
pub struct FixSummary {
    /// Inputs whose text changed.
    pub inputs_modified: usize,
    /// Statements left alone because they did not tokenize or parse.
    pub statements_skipped: usize,
    /// Inputs aborted by conflicting or non-converging fixes.
    pub failures: Vec<FixFailure>,
}

/// Apply auto-fixes to every source, updating `content` in place.
///
/// File-backed sources are written back to disk when they change; stdin
/// sources print their fixed text (changed or not) to stdout.
pub fn apply_fixes(engine: &StyleEngine, sources: &mut [SourceFile]) -> Result<FixSummary> {
    let mut summary = FixSummary::default();

    for source in sources.iter_mut() {
        let outcome = match engine.format(&source.content) {
            Ok(outcome) => outcome,
            Err(err) => {
                summary.failures.push(FixFailure {
                    name: source.name.clone(),
                    source: err,
                });
                continue;
            }
        };

        summary.statements_skipped += outcome.skipped.len();

        if outcome.changed {
            summary.inputs_modified += 1;
            source.content = outcome.text;
        }

        match &source.path {
            Some(path) if outcome.changed => {
                fs::write(path, &source.content)
                    .with_context(|| format!("Failed to write fixed SQL to {}", path.display()))?;
            }
            Some(_) => {}
            None => {
                io::stdout()
                    .write_all(source.content.as_bytes())
                    .context("Failed to write fixed SQL to stdout")?;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqltidy_core::StyleConfig;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn engine() -> StyleEngine {
        StyleEngine::new(StyleConfig::default())
    }

    fn file_source(path: PathBuf, content: &str) -> SourceFile {
        SourceFile {
            name: path.display().to_string(),
            content: content.to_string(),
            path: Some(path),
        }
    }

    #[test]
    fn test_fix_writes_back_changed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.sql");
        fs::write(&path, "select 1").unwrap();

        let mut sources = vec![file_source(path.clone(), "select 1")];
        let summary = apply_fixes(&engine(), &mut sources).unwrap();

        assert_eq!(summary.inputs_modified, 1);
        assert!(summary.failures.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "SELECT 1");
        assert_eq!(sources[0].content, "SELECT 1");
    }

    #[test]
    fn test_fix_leaves_clean_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.sql");
        fs::write(&path, "SELECT 1").unwrap();

        let mut sources = vec![file_source(path.clone(), "SELECT 1")];
        let summary = apply_fixes(&engine(), &mut sources).unwrap();

        assert_eq!(summary.inputs_modified, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_fix_counts_unparsable_statements() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.sql");
        let sql = "SELECT 'oops; SELECT 1";
        fs::write(&path, sql).unwrap();

        let mut sources = vec![file_source(path.clone(), sql)];
        let summary = apply_fixes(&engine(), &mut sources).unwrap();

        assert_eq!(summary.statements_skipped, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), sql);
    }
}
