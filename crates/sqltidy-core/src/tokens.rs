//! Lossless tokenizer for the supported SQL dialect.
//!
//! Every byte of the input lands in exactly one token, including whitespace
//! and comments, so concatenating [`Token::text`] in order reconstructs the
//! source (see [`tokenize`]). Layout rules and the formatter depend on that
//! property.

use crate::error::{LexError, Position};
use std::ops::Range;

/// Token classification.
///
/// `Whitespace`, `LineComment`, and `BlockComment` are trivia: carried for
/// losslessness, skipped by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A word from the reserved keyword table, in whatever case it was typed.
    Keyword,
    /// A bare identifier, including ones containing non-ASCII characters.
    Identifier,
    /// A `"double quoted"` identifier, quotes included in the text.
    QuotedIdentifier,
    /// A `'single quoted'` literal, quotes included in the text.
    StringLiteral,
    /// A numeric literal.
    Number,
    /// An operator such as `=`, `<>`, `||`, or `::`.
    Operator,
    Comma,
    Dot,
    LParen,
    RParen,
    Semicolon,
    /// `-- ...` up to (not including) the line break.
    LineComment,
    /// `/* ... */`, nesting allowed.
    BlockComment,
    /// A run of spaces, tabs, carriage returns, and newlines.
    Whitespace,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A single token with its exact source text and location.
///
/// Offsets are byte positions relative to the tokenized text (the statement,
/// when tokenizing one statement of a batch). `line` and `column` are
/// 1-indexed; columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// True when this token is the keyword `kw` (compared case-insensitively).
    pub fn matches_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(kw)
    }

    /// True when this token is the operator `op`.
    pub fn matches_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn position(&self) -> Position {
        Position::new(self.start, self.line, self.column)
    }
}

/// Reserved words recognized by the dialect, uppercase and sorted for binary
/// search. `TRUE`, `FALSE`, and `NULL` are keywords, not identifiers.
pub(crate) const KEYWORDS: &[&str] = &[
    "ALL",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "CROSS",
    "DESC",
    "DISTINCT",
    "ELSE",
    "END",
    "EXCEPT",
    "EXISTS",
    "FALSE",
    "FIRST",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "ILIKE",
    "IN",
    "INNER",
    "INTERSECT",
    "IS",
    "JOIN",
    "LAST",
    "LEFT",
    "LIKE",
    "LIMIT",
    "NOT",
    "NULL",
    "NULLS",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "OVER",
    "PARTITION",
    "RECURSIVE",
    "RIGHT",
    "SELECT",
    "THEN",
    "TRUE",
    "UNION",
    "USING",
    "WHEN",
    "WHERE",
    "WITH",
];

/// Whether `word` is a reserved keyword, regardless of case.
pub fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

/// Tokenize `sql` into a lossless stream.
///
/// Concatenating the `text` of every returned token reproduces `sql`
/// byte for byte. Unknown ASCII punctuation becomes a one-character
/// [`TokenKind::Operator`] token rather than an error; only unterminated
/// strings, quoted identifiers, and block comments fail.
pub fn tokenize(sql: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(sql).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut out = Vec::new();
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    let end = self.scan_while(self.pos, |b| {
                        matches!(b, b' ' | b'\t' | b'\r' | b'\n')
                    });
                    self.emit(TokenKind::Whitespace, end, &mut out);
                }
                b'-' if self.peek(1) == Some(b'-') => {
                    let end = self.scan_while(self.pos + 2, |b| b != b'\n');
                    self.emit(TokenKind::LineComment, end, &mut out);
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let end = self.scan_block_comment()?;
                    self.emit(TokenKind::BlockComment, end, &mut out);
                }
                b'\'' => {
                    let end = self.scan_quoted(b'\'', "single")?;
                    self.emit(TokenKind::StringLiteral, end, &mut out);
                }
                b'"' => {
                    let end = self.scan_quoted(b'"', "double")?;
                    self.emit(TokenKind::QuotedIdentifier, end, &mut out);
                }
                b'0'..=b'9' => {
                    let end = self.scan_number(self.pos);
                    self.emit(TokenKind::Number, end, &mut out);
                }
                b'.' if self.peek(1).is_some_and(|b| b.is_ascii_digit()) => {
                    let end = self.scan_number(self.pos);
                    self.emit(TokenKind::Number, end, &mut out);
                }
                b'.' => self.emit(TokenKind::Dot, self.pos + 1, &mut out),
                b',' => self.emit(TokenKind::Comma, self.pos + 1, &mut out),
                b'(' => self.emit(TokenKind::LParen, self.pos + 1, &mut out),
                b')' => self.emit(TokenKind::RParen, self.pos + 1, &mut out),
                b';' => self.emit(TokenKind::Semicolon, self.pos + 1, &mut out),
                _ if is_word_start(b) => {
                    let end = self.scan_while(self.pos, is_word_continue);
                    let kind = if is_keyword(&self.src[self.pos..end]) {
                        TokenKind::Keyword
                    } else {
                        TokenKind::Identifier
                    };
                    self.emit(kind, end, &mut out);
                }
                _ => {
                    let end = self.scan_operator();
                    self.emit(TokenKind::Operator, end, &mut out);
                }
            }
        }
        Ok(out)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let mut i = from;
        while i < self.bytes.len() && pred(self.bytes[i]) {
            i += 1;
        }
        i
    }

    fn scan_quoted(&self, quote: u8, quote_name: &'static str) -> Result<usize, LexError> {
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            if self.bytes[i] == quote {
                // A doubled quote is an escaped quote, not a terminator.
                if self.bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                } else {
                    return Ok(i + 1);
                }
            } else {
                i += 1;
            }
        }
        Err(LexError::UnterminatedString {
            quote: quote_name,
            position: Position::new(self.pos, self.line, self.column),
        })
    }

    fn scan_block_comment(&self) -> Result<usize, LexError> {
        let mut depth = 1usize;
        let mut i = self.pos + 2;
        while i < self.bytes.len() {
            if self.bytes[i] == b'*' && self.bytes.get(i + 1) == Some(&b'/') {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Ok(i);
                }
            } else if self.bytes[i] == b'/' && self.bytes.get(i + 1) == Some(&b'*') {
                depth += 1;
                i += 2;
            } else {
                i += 1;
            }
        }
        Err(LexError::UnterminatedBlockComment {
            position: Position::new(self.pos, self.line, self.column),
        })
    }

    fn scan_number(&self, from: usize) -> usize {
        let mut i = self.scan_while(from, |b| b.is_ascii_digit());
        if self.bytes.get(i) == Some(&b'.') {
            i = self.scan_while(i + 1, |b| b.is_ascii_digit());
        }
        // Exponent only counts when at least one digit follows it.
        if matches!(self.bytes.get(i), Some(&b'e') | Some(&b'E')) {
            let mut j = i + 1;
            if matches!(self.bytes.get(j), Some(&b'+') | Some(&b'-')) {
                j += 1;
            }
            if self.bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
                i = self.scan_while(j, |b| b.is_ascii_digit());
            }
        }
        i
    }

    fn scan_operator(&self) -> usize {
        let rest = &self.bytes[self.pos..];
        let two = matches!(
            (rest.first().copied(), rest.get(1).copied()),
            (Some(b'<'), Some(b'>'))
                | (Some(b'<'), Some(b'='))
                | (Some(b'>'), Some(b'='))
                | (Some(b'!'), Some(b'='))
                | (Some(b'|'), Some(b'|'))
                | (Some(b':'), Some(b':'))
        );
        if two {
            self.pos + 2
        } else {
            self.pos + 1
        }
    }

    fn emit(&mut self, kind: TokenKind, end: usize, out: &mut Vec<Token>) {
        out.push(Token {
            kind,
            text: self.src[self.pos..end].to_string(),
            start: self.pos,
            end,
            line: self.line,
            column: self.column,
        });
        self.advance_to(end);
    }

    fn advance_to(&mut self, end: usize) {
        for &b in &self.bytes[self.pos..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                // Count characters, not bytes: UTF-8 continuation bytes do
                // not start a new column.
                self.column += 1;
            }
        }
        self.pos = end;
    }
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_word_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Split a source text into per-statement byte ranges at top-level
/// semicolons. The semicolons themselves are excluded from the ranges.
///
/// Semicolons inside string literals, quoted identifiers, and comments do
/// not split. Unterminated constructs swallow the rest of the input instead
/// of failing; the per-statement tokenizer reports them properly.
pub fn split_statements(sql: &str) -> Vec<Range<usize>> {
    let bytes = sql.as_bytes();
    let mut ranges = Vec::new();
    let mut seg_start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                        } else {
                            i += 1;
                            break;
                        }
                    } else {
                        i += 1;
                    }
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let mut depth = 1usize;
                i += 2;
                while i < bytes.len() && depth > 0 {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        depth -= 1;
                        i += 2;
                    } else if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                        depth += 1;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            }
            b';' => {
                ranges.push(seg_start..i);
                seg_start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if seg_start < bytes.len() {
        ranges.push(seg_start..bytes.len());
    }
    ranges
}
