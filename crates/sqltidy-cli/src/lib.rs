//! sqltidy CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `sqltidy` binary.

pub mod cli;
pub mod fix;
pub mod input;
pub mod output;
pub mod rules_table;

// Re-export commonly used types
pub use cli::Args;
