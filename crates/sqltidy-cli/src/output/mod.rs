//! Report rendering modules.

pub mod check;

pub use check::{
    file_result, format_check_json, format_check_results, offset_to_line_col, FileCheckResult,
    ViolationRow,
};

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Write the rendered report to a file, or to stdout when no path is given.
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
