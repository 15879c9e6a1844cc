//! STYLE_LT_005: CASE layout.
//!
//! A `CASE` with two or more branches is laid out vertically: nothing after
//! `CASE` on its line, each `WHEN` one indent deeper on its own line with its
//! `THEN` beside it, `ELSE` aligned with the branches, `END` back at the
//! `CASE` line's indentation. A one-branch `CASE` may stay inline.
//!
//! Indentation is measured from the line holding `CASE`, so the rule works
//! the same inside nested subqueries.

use crate::ast::{walk_expressions, walk_selects, CaseExpression, Expression, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::{Edit, Fix};
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::violation::{rule_codes, Span, Violation};

use super::layout::{self, GapCheck};

pub struct CaseLayoutRule {
    indent_width: usize,
}

impl CaseLayoutRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            indent_width: config.indent_width,
        }
    }

    fn check_case(&self, case: &CaseExpression, ctx: &RuleContext<'_>) -> Vec<Violation> {
        if case.branches.len() < 2 {
            return Vec::new();
        }
        let text = ctx.statement_text();
        let li = layout::line_indent(text, case.case_span.start);
        let branch_sep = format!("\n{li}{}", " ".repeat(self.indent_width));

        // Gap plan; `anchor` marks the gap that positions a WHEN keyword.
        let mut gaps: Vec<(GapCheck, Option<Span>)> = Vec::new();
        let mut require = |offset: usize, want: String, anchor: Option<Span>| {
            if let Some(span) = layout::gap_before(ctx.tokens, offset) {
                gaps.push((GapCheck { span, want }, anchor));
            }
        };

        if let Some(operand) = &case.operand {
            require(operand.span().start, " ".to_string(), None);
        }
        for branch in &case.branches {
            require(branch.when_span.start, branch_sep.clone(), Some(branch.when_span));
            require(branch.condition.span().start, " ".to_string(), None);
            require(branch.then_span.start, " ".to_string(), None);
            require(branch.result.span().start, " ".to_string(), None);
        }
        if let Some(else_branch) = &case.else_branch {
            require(else_branch.else_span.start, branch_sep.clone(), None);
            require(else_branch.result.span().start, " ".to_string(), None);
        }
        require(case.end_span.start, format!("\n{li}"), None);

        let mut edits = Vec::new();
        let mut misplaced_whens = Vec::new();
        let mut other_mismatch = false;
        for (gap, anchor) in &gaps {
            if layout::gap_has_comment(ctx.tokens, gap.span) {
                continue;
            }
            if ctx.slice(gap.span) != gap.want {
                edits.push(Edit::replace(ctx.abs(gap.span), gap.want.clone()));
                match anchor {
                    Some(when) => misplaced_whens.push(*when),
                    None => other_mismatch = true,
                }
            }
        }
        if edits.is_empty() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        if misplaced_whens.is_empty() {
            debug_assert!(other_mismatch);
            violations.push(
                Violation::warning(
                    rule_codes::STYLE_LT_005,
                    "CASE internals have irregular spacing.",
                )
                .with_span(ctx.abs(case.case_span))
                .with_fix(Fix::new(rule_codes::STYLE_LT_005, edits)),
            );
        } else {
            for (i, when) in misplaced_whens.iter().enumerate() {
                let mut violation = Violation::warning(
                    rule_codes::STYLE_LT_005,
                    "Each WHEN belongs on its own line below CASE.",
                )
                .with_span(ctx.abs(*when));
                if i == 0 {
                    // The whole layout fix rides on the first finding.
                    violation =
                        violation.with_fix(Fix::new(rule_codes::STYLE_LT_005, std::mem::take(&mut edits)));
                }
                violations.push(violation);
            }
        }
        violations
    }
}

impl Default for CaseLayoutRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for CaseLayoutRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_LT_005
    }

    fn name(&self) -> &'static str {
        "case-layout"
    }

    fn description(&self) -> &'static str {
        "Multi-branch CASE expressions put each WHEN on its own line."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            walk_expressions(select, &mut |expr| {
                if let Expression::Case(case) = expr {
                    violations.extend(self.check_case(case, ctx));
                }
            });
        });
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StyleEngine;
    use crate::parser::parse;
    use crate::tokens::tokenize;

    fn check_sql(sql: &str) -> Vec<Violation> {
        let tokens = tokenize(sql).unwrap();
        let statement = parse(&tokens).unwrap();
        let config = StyleConfig::default();
        let ctx = RuleContext {
            sql,
            statement_range: 0..sql.len(),
            statement_index: 0,
            tokens: &tokens,
            config: &config,
            catalog: None,
        };
        CaseLayoutRule::default().check(&statement, &ctx).unwrap()
    }

    fn fix(sql: &str) -> String {
        let mut engine = StyleEngine::new(StyleConfig::default());
        engine.filter_rules(|code| code == rule_codes::STYLE_LT_005);
        engine.format(sql).unwrap().text
    }

    #[test]
    fn test_one_line_case_flags_each_when() {
        let violations =
            check_sql("SELECT case when x = 1 then 'a' when y = 2 then 'b' end FROM t");
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.message == "Each WHEN belongs on its own line below CASE."));
    }

    #[test]
    fn test_well_formed_case_ok() {
        let sql = "SELECT\n    case\n        when a = 1 then 'one'\n        when a = 2 then 'two'\n        else 'many'\n    end as bucket\nFROM t";
        assert!(check_sql(sql).is_empty());
    }

    #[test]
    fn test_single_branch_case_may_stay_inline() {
        assert!(check_sql("SELECT case when a then 1 else 0 end FROM t").is_empty());
    }

    #[test]
    fn test_fix_lays_out_branches() {
        let sql = "SELECT\n    case when a = 1 then 'one' when a = 2 then 'two' end as bucket\nFROM t";
        assert_eq!(
            fix(sql),
            "SELECT\n    case\n        when a = 1 then 'one'\n        when a = 2 then 'two'\n    end as bucket\nFROM t"
        );
    }

    #[test]
    fn test_then_rejoined_to_its_when() {
        let sql = "SELECT\n    case\n        when a = 1\n        then 'one'\n        when b = 2\n        then 'two'\n    end as x\nFROM t";
        assert_eq!(
            fix(sql),
            "SELECT\n    case\n        when a = 1 then 'one'\n        when b = 2 then 'two'\n    end as x\nFROM t"
        );
    }

    #[test]
    fn test_operand_form() {
        let sql = "SELECT\n    case plan\n        when 'free' then 0\n        when 'pro' then 1\n    end as tier\nFROM t";
        assert!(check_sql(sql).is_empty());
    }
}
