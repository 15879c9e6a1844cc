pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod schema;
pub mod tokens;
pub mod violation;

// Re-export the main entry points
pub use engine::{CheckReport, FormatOutcome, SkippedStatement, StyleEngine};
pub use parser::parse;
pub use tokens::{split_statements, tokenize, Token, TokenKind};

// Re-export types explicitly
pub use config::{KeywordCase, NamingConventions, StyleConfig};
pub use engine::fix::{Edit, Fix};
pub use engine::rule::{RuleContext, StyleRule};
pub use error::{ConflictError, LexError, ParseError, Position, RuleError};
pub use schema::{ColumnCategory, ColumnSchema, SchemaCatalog, TableSchema};
pub use violation::{rule_codes, Severity, Span, Violation};
