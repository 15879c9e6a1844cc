//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::PathBuf;

/// One SQL input, read from a file or stdin.
pub struct SourceFile {
    /// Display name: the path as given, or `<stdin>`.
    pub name: String,
    pub content: String,
    /// Present for file inputs; `--fix` writes back through it.
    pub path: Option<PathBuf>,
}

/// Read SQL input from files or stdin.
///
/// If no files are provided, reads from stdin.
pub fn read_sources(files: &[PathBuf]) -> Result<Vec<SourceFile>> {
    if files.is_empty() {
        read_from_stdin()
    } else {
        read_from_files(files)
    }
}

fn read_from_stdin() -> Result<Vec<SourceFile>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(vec![SourceFile {
        name: "<stdin>".to_string(),
        content,
        path: None,
    }])
}

fn read_from_files(files: &[PathBuf]) -> Result<Vec<SourceFile>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            Ok(SourceFile {
                name: path.display().to_string(),
                content,
                path: Some(path.clone()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_single_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SELECT * FROM users").unwrap();

        let sources = read_from_files(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].content.contains("SELECT * FROM users"));
        assert!(sources[0].path.is_some());
    }

    #[test]
    fn test_read_multiple_files() {
        let mut file1 = NamedTempFile::new().unwrap();
        let mut file2 = NamedTempFile::new().unwrap();
        writeln!(file1, "SELECT * FROM users").unwrap();
        writeln!(file2, "SELECT * FROM charges").unwrap();

        let sources =
            read_from_files(&[file1.path().to_path_buf(), file2.path().to_path_buf()]).unwrap();
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_from_files(&[PathBuf::from("/nonexistent/file.sql")]);
        assert!(result.is_err());
    }
}
