//! STYLE_CP_001: Keyword case.
//!
//! Reserved keywords are written in the configured case (uppercase by
//! default). One violation per offending token, each with a rewrite fix.

use crate::ast::Statement;
use crate::config::{KeywordCase, StyleConfig};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::tokens::TokenKind;
use crate::violation::{rule_codes, Violation};

pub struct KeywordCaseRule {
    case: KeywordCase,
}

impl KeywordCaseRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            case: config.keyword_case,
        }
    }
}

impl Default for KeywordCaseRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for KeywordCaseRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_CP_001
    }

    fn name(&self) -> &'static str {
        "keyword-case"
    }

    fn description(&self) -> &'static str {
        "Reserved keywords use the configured case."
    }

    fn check(
        &self,
        _statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for token in ctx.tokens {
            if token.kind != TokenKind::Keyword {
                continue;
            }
            let want = self.case.apply(&token.text);
            if want == token.text {
                continue;
            }
            let span = ctx.span(token.start, token.end);
            violations.push(
                Violation::warning(
                    rule_codes::STYLE_CP_001,
                    format!(
                        "Keyword '{}' should be {} case.",
                        token.text,
                        self.case.label()
                    ),
                )
                .with_span(span)
                .with_fix(Fix::single(rule_codes::STYLE_CP_001, Edit::replace(span, want))),
            );
        }
        Ok(violations)
    }
}
