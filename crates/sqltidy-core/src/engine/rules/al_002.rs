//! STYLE_AL_002: Computed select items need names, and names need `AS`.
//!
//! `count(*)` lands in the result set as whatever the engine invents for
//! it; forcing an alias keeps downstream references stable. Aliases that
//! do exist must be introduced with `AS`, which the fix inserts.

use crate::ast::{walk_selects, Expression, Statement};
use crate::config::{KeywordCase, StyleConfig};
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Span, Violation};

pub struct ColumnAliasRule {
    case: KeywordCase,
}

impl ColumnAliasRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            case: config.keyword_case,
        }
    }
}

impl Default for ColumnAliasRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for ColumnAliasRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_AL_002
    }

    fn name(&self) -> &'static str {
        "column-alias"
    }

    fn description(&self) -> &'static str {
        "Function results carry an alias, and every alias is introduced with AS."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            for item in &select.items {
                match &item.alias {
                    None => {
                        if let Expression::Function(call) = &item.expr {
                            violations.push(
                                Violation::warning(
                                    rule_codes::STYLE_AL_002,
                                    format!("Alias the result of {}().", call.name.name),
                                )
                                .with_span(ctx.abs(item.span)),
                            );
                        }
                    }
                    Some(alias) if alias.as_span.is_none() => {
                        let at = ctx.abs(alias.name.span).start;
                        let keyword = self.case.apply("as");
                        violations.push(
                            Violation::warning(
                                rule_codes::STYLE_AL_002,
                                format!("Introduce the alias '{}' with AS.", alias.name.name),
                            )
                            .with_span(Span::new(at, at))
                            .with_fix(Fix::single(
                                rule_codes::STYLE_AL_002,
                                Edit::insert(at, format!("{keyword} ")),
                            )),
                        );
                    }
                    Some(_) => {}
                }
            }
        });
        Ok(violations)
    }
}
