//! STYLE_ST_005: CTE names say what the rows are.
//!
//! `tmp` and `t2` tell the next reader nothing; a CTE is the one place in
//! a query where a good name is free.

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::Statement;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Violation};

const MIN_CTE_NAME_LEN: usize = 4;

fn placeholder_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(cte|data|tmp|temp|t\d*|x\d*|foo|bar)$").unwrap())
}

#[derive(Default)]
pub struct CteNamingRule;

impl CteNamingRule {
    pub fn from_config(_config: &crate::config::StyleConfig) -> Self {
        Self
    }
}

impl StyleRule for CteNamingRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_ST_005
    }

    fn name(&self) -> &'static str {
        "cte-naming"
    }

    fn description(&self) -> &'static str {
        "CTE names are descriptive words, not placeholders."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let Statement::With(block) = statement else {
            return Ok(Vec::new());
        };
        let mut violations = Vec::new();
        for cte in &block.ctes {
            let name = &cte.name.name;
            let lowered = name.to_ascii_lowercase();
            if name.len() < MIN_CTE_NAME_LEN || placeholder_name().is_match(&lowered) {
                violations.push(
                    Violation::warning(
                        rule_codes::STYLE_ST_005,
                        format!("CTE name '{name}' is not descriptive."),
                    )
                    .with_span(ctx.abs(cte.name.span)),
                );
            }
        }
        Ok(violations)
    }
}
