//! Fuzz target for the style engine.
//!
//! This tests that `check()` and `format()` don't panic on arbitrary SQL,
//! and that a formatted text comes back unchanged from a second pass.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sqltidy_core::{KeywordCase, StyleConfig, StyleEngine};

/// Structured input for fuzzing - varies the configuration knobs too.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    case_idx: u8,
    indent_width: u8,
    max_inline_columns: u8,
}

impl FuzzInput {
    fn config(&self) -> StyleConfig {
        StyleConfig {
            keyword_case: match self.case_idx % 2 {
                0 => KeywordCase::Upper,
                _ => KeywordCase::Lower,
            },
            indent_width: usize::from(self.indent_width % 8) + 1,
            max_inline_columns: usize::from(self.max_inline_columns % 4) + 1,
            ..StyleConfig::default()
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let engine = StyleEngine::new(input.config());
    let _report = engine.check(&input.sql);

    // Formatting either settles or reports a conflict; it never panics. When
    // it settles, the result must survive a second pass unchanged.
    if let Ok(outcome) = engine.format(&input.sql) {
        if let Ok(again) = engine.format(&outcome.text) {
            assert_eq!(outcome.text, again.text);
        }
    }
});
