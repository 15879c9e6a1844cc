//! Fuzz target for the tokenizer and parser.
//!
//! This tests that `tokenize()` and `parse()` don't panic on arbitrary inputs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sqltidy_core::{parse, split_statements, tokenize};

fuzz_target!(|sql: String| {
    // The tokenizer and parser should never panic - invalid SQL comes back
    // as Result::Err.
    for range in split_statements(&sql) {
        if let Ok(tokens) = tokenize(&sql[range]) {
            let _result = parse(&tokens);
        }
    }
});
