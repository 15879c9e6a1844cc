//! Error types for tokenizing, parsing, and formatting.
//!
//! # Error Handling Strategy
//!
//! This crate uses two complementary error handling patterns:
//!
//! - [`LexError`] and [`ParseError`]: fatal per statement. Returned as
//!   `Result<T, E>` from [`crate::tokenize`] and [`crate::parse`], and stop
//!   processing of the affected statement. In batch checking the engine
//!   converts them into error-severity [`crate::Violation`]s so the
//!   remaining statements keep flowing.
//!
//! - [`crate::Violation`]: non-fatal style findings collected during a check
//!   run. These are data, never errors.
//!
//! [`ConflictError`] is specific to format mode: when two auto-fix rules
//! produce overlapping edits the run aborts with both rule codes and no
//! partial output. [`RuleError`] covers a rule predicate failing
//! unexpectedly; the engine records it as a diagnostic and keeps evaluating
//! the remaining rules.

use std::fmt;
use thiserror::Error;

/// A position in the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset (0-indexed).
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, counted in characters).
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Error encountered while tokenizing statement text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A string literal or quoted identifier was opened but never closed.
    #[error("unterminated {quote}-quoted literal starting at {position}")]
    UnterminatedString {
        /// "single" or "double".
        quote: &'static str,
        position: Position,
    },

    /// A `/* ... */` comment was opened but never closed.
    #[error("unterminated block comment starting at {position}")]
    UnterminatedBlockComment { position: Position },
}

impl LexError {
    /// The position where the offending construct starts.
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedString { position, .. } => *position,
            Self::UnterminatedBlockComment { position } => *position,
        }
    }
}

/// Error encountered while parsing a token stream into a statement tree.
///
/// Only structural well-formedness is checked: an unmatched parenthesis or a
/// clause out of place fails, a reference to an undefined table or CTE does
/// not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found} at {position}")]
pub struct ParseError {
    /// What the parser was looking for (e.g. "expression", "keyword THEN").
    pub expected: String,
    /// What it found instead, or "end of statement".
    pub found: String,
    /// Where the mismatch occurred.
    pub position: Position,
}

impl ParseError {
    pub fn new(
        expected: impl Into<String>,
        found: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
            position,
        }
    }
}

/// Error raised in format mode when auto-fixes cannot be applied safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    /// Two rules produced overlapping edits in the same pass.
    #[error("conflicting fixes from {first} and {second} over bytes {start}..{end}")]
    Overlap {
        /// Rule code of the first edit, in span order.
        first: String,
        /// Rule code of the overlapping edit.
        second: String,
        start: usize,
        end: usize,
    },

    /// Fix passes kept producing edits without reaching a fixed point.
    #[error("fixes did not converge after {passes} passes (rules still active: {})", rules.join(", "))]
    Unstable { rules: Vec<String>, passes: usize },
}

/// A rule predicate failed unexpectedly.
///
/// Caught per rule and recorded as a diagnostic; the remaining rules keep
/// running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule {rule} failed: {message}")]
pub struct RuleError {
    pub rule: String,
    pub message: String,
}

impl RuleError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_display() {
        let err = LexError::UnterminatedString {
            quote: "single",
            position: Position::new(7, 1, 8),
        };
        assert_eq!(
            err.to_string(),
            "unterminated single-quoted literal starting at line 1, column 8"
        );
        assert_eq!(err.position().offset, 7);
    }

    #[test]
    fn test_block_comment_error_display() {
        let err = LexError::UnterminatedBlockComment {
            position: Position::new(0, 2, 3),
        };
        assert_eq!(
            err.to_string(),
            "unterminated block comment starting at line 2, column 3"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("keyword THEN", "'END'", Position::new(40, 3, 5));
        assert_eq!(
            err.to_string(),
            "expected keyword THEN, found 'END' at line 3, column 5"
        );
    }

    #[test]
    fn test_conflict_error_display() {
        let err = ConflictError::Overlap {
            first: "STYLE_CP_001".to_string(),
            second: "STYLE_CV_002".to_string(),
            start: 10,
            end: 12,
        };
        assert_eq!(
            err.to_string(),
            "conflicting fixes from STYLE_CP_001 and STYLE_CV_002 over bytes 10..12"
        );
    }

    #[test]
    fn test_unstable_error_display() {
        let err = ConflictError::Unstable {
            rules: vec!["STYLE_LT_001".to_string(), "STYLE_LT_005".to_string()],
            passes: 8,
        };
        assert_eq!(
            err.to_string(),
            "fixes did not converge after 8 passes (rules still active: STYLE_LT_001, STYLE_LT_005)"
        );
    }
}
