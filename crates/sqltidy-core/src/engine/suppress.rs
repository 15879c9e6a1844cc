//! `-- noqa` comment handling.
//!
//! A line comment of the form `-- noqa` suppresses every violation starting
//! on its line; `-- noqa: STYLE_CP_001, STYLE_LT_001` suppresses only the
//! listed codes. The scan is tolerant: it never fails, even on text the
//! tokenizer rejects, so suppressions in healthy statements survive a lex
//! error elsewhere in the batch.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub(crate) struct SuppressMap {
    /// Lines with a bare `-- noqa`.
    blanket: HashSet<usize>,
    /// Lines with `-- noqa: CODE[, CODE]`, codes uppercased.
    by_code: HashMap<usize, HashSet<String>>,
}

impl SuppressMap {
    pub(crate) fn scan(sql: &str) -> Self {
        let bytes = sql.as_bytes();
        let mut map = SuppressMap::default();
        let mut line = 1usize;
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    i += 1;
                }
                quote @ (b'\'' | b'"') => {
                    i += 1;
                    while i < bytes.len() {
                        if bytes[i] == b'\n' {
                            line += 1;
                            i += 1;
                        } else if bytes[i] == quote {
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
                    let start = i;
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                    map.record(&sql[start..i], line);
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
                            if bytes[i] == b'\n' {
                                line += 1;
                            }
                            i += 1;
                        }
                    }
                }
                _ => i += 1,
            }
        }
        map
    }

    /// Parse one line comment and record it when it is a directive.
    fn record(&mut self, comment: &str, line: usize) {
        let body = comment.trim_start_matches('-').trim_start();
        if body.len() < 4 || !body[..4].eq_ignore_ascii_case("noqa") {
            return;
        }
        let rest = body[4..].trim();
        if rest.is_empty() {
            self.blanket.insert(line);
        } else if let Some(codes) = rest.strip_prefix(':') {
            let entry = self.by_code.entry(line).or_default();
            for code in codes.split(',') {
                let code = code.trim();
                if !code.is_empty() {
                    entry.insert(code.to_ascii_uppercase());
                }
            }
        }
        // Anything else ("-- noqasha") is an ordinary comment.
    }

    pub(crate) fn is_suppressed(&self, line: usize, code: &str) -> bool {
        if self.blanket.contains(&line) {
            return true;
        }
        self.by_code
            .get(&line)
            .is_some_and(|codes| codes.contains(&code.to_ascii_uppercase()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.blanket.is_empty() && self.by_code.is_empty()
    }
}

/// 1-indexed line containing `offset`.
pub(crate) fn line_of_offset(sql: &str, offset: usize) -> usize {
    let end = offset.min(sql.len());
    sql.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanket_noqa() {
        let map = SuppressMap::scan("select 1 -- noqa\nselect 2");
        assert!(map.is_suppressed(1, "STYLE_CP_001"));
        assert!(!map.is_suppressed(2, "STYLE_CP_001"));
    }

    #[test]
    fn test_code_specific_noqa() {
        let map = SuppressMap::scan("select 1 -- noqa: STYLE_CP_001, style_lt_001");
        assert!(map.is_suppressed(1, "STYLE_CP_001"));
        assert!(map.is_suppressed(1, "style_lt_001"));
        assert!(!map.is_suppressed(1, "STYLE_CV_002"));
    }

    #[test]
    fn test_case_insensitive_directive() {
        let map = SuppressMap::scan("select 1 -- NOQA");
        assert!(map.is_suppressed(1, "STYLE_AL_001"));
    }

    #[test]
    fn test_noqa_inside_string_is_ignored() {
        let map = SuppressMap::scan("select '-- noqa' from t");
        assert!(map.is_empty());
    }

    #[test]
    fn test_noqa_like_word_is_ignored() {
        let map = SuppressMap::scan("select 1 -- noqanope");
        assert!(map.is_empty());
    }

    #[test]
    fn test_multiline_string_keeps_line_numbers() {
        let map = SuppressMap::scan("select 'a\nb\nc' -- noqa");
        assert!(map.is_suppressed(3, "STYLE_CP_001"));
    }

    #[test]
    fn test_line_of_offset() {
        let sql = "a\nbb\nccc";
        assert_eq!(line_of_offset(sql, 0), 1);
        assert_eq!(line_of_offset(sql, 2), 2);
        assert_eq!(line_of_offset(sql, 7), 3);
        assert_eq!(line_of_offset(sql, 999), 3);
    }
}
