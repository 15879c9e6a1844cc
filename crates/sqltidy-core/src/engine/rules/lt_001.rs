//! STYLE_LT_001: Select layout.
//!
//! The layout threshold: a select projecting more than `max_inline_columns`
//! expressions lists them one per line, indented once, with the comma at the
//! end of the line. Clause keywords (`FROM`, joins, `WHERE`, `GROUP BY`, ...)
//! start their own lines as soon as any clause beyond a plain `FROM` is
//! present. Only a select with a single projected item and at most a bare
//! `FROM` may sit on one line.
//!
//! The rule states a target text for every gap it owns and fixes the gaps
//! that differ. Gaps holding comments are pinned. A select that does not
//! start its line (a subquery in expression position) keeps its line
//! structure; only item separation is reported there, without a fix.

use std::collections::HashSet;

use crate::ast::{walk_selects, JoinConstraint, SelectStatement, Statement};
use crate::config::StyleConfig;
use crate::engine::fix::Fix;
use crate::engine::rule::{RuleContext, StyleRule};
use crate::error::RuleError;
use crate::tokens::TokenKind;
use crate::violation::{rule_codes, Violation};

use super::layout::{self, GapCheck};

pub struct SelectLayoutRule {
    indent_width: usize,
    max_inline_columns: usize,
}

impl SelectLayoutRule {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            indent_width: config.indent_width,
            max_inline_columns: config.max_inline_columns,
        }
    }

    fn check_select(
        &self,
        select: &SelectStatement,
        ctx: &RuleContext<'_>,
        is_set_arm: bool,
    ) -> Option<Violation> {
        let text = ctx.statement_text();
        let items = &select.items;
        if items.is_empty() {
            return None;
        }

        let has_joins = select.from.as_ref().is_some_and(|f| !f.joins.is_empty());
        let has_later_clauses = select.where_clause.is_some()
            || select.group_by.is_some()
            || select.having.is_some()
            || select.order_by.is_some()
            || select.limit.is_some()
            || !select.set_ops.is_empty();
        // A set-operation arm mirrors the leading select's clause layout.
        let simple = items.len() <= self.max_inline_columns
            && !has_joins
            && !has_later_clauses
            && !is_set_arm;

        let Some(base) = layout::indent_if_line_leading(text, select.select_span.start) else {
            return self.check_mid_line(select, ctx);
        };

        let one_line = !text[select.select_span.start..select.span.end].contains('\n');
        let item_sep = if items.len() <= self.max_inline_columns {
            " ".to_string()
        } else {
            format!("\n{base}{}", " ".repeat(self.indent_width))
        };
        let clause_sep = if simple && one_line {
            " ".to_string()
        } else {
            format!("\n{base}")
        };

        let mut gaps: Vec<GapCheck> = Vec::new();
        let mut require = |offset: usize, want: String| {
            if let Some(span) = layout::gap_before(ctx.tokens, offset) {
                gaps.push(GapCheck { span, want });
            }
        };

        if select.distinct {
            if let Some(kw) = layout::next_significant(ctx.tokens, select.select_span.end) {
                require(kw.start, " ".to_string());
            }
        }
        require(items[0].span.start, item_sep.clone());
        for pair in items.windows(2) {
            if let Some(comma) = layout::next_significant(ctx.tokens, pair[0].span.end) {
                if comma.kind == TokenKind::Comma {
                    require(comma.start, String::new());
                }
            }
            require(pair[1].span.start, item_sep.clone());
        }

        if let Some(from) = &select.from {
            require(from.keyword_span.start, clause_sep.clone());
            require(from.base.span().start, " ".to_string());
            for join in &from.joins {
                require(join.keywords_span.start, clause_sep.clone());
                for kw in layout::significant_within(ctx.tokens, join.keywords_span)
                    .iter()
                    .skip(1)
                {
                    require(kw.start, " ".to_string());
                }
                require(join.table.span().start, " ".to_string());
                match &join.constraint {
                    Some(JoinConstraint::On(on)) => {
                        require(on.keyword_span.start, " ".to_string());
                    }
                    Some(JoinConstraint::Using(using)) => {
                        require(using.keyword_span.start, " ".to_string());
                    }
                    None => {}
                }
            }
        }
        if let Some(w) = &select.where_clause {
            require(w.keyword_span.start, clause_sep.clone());
        }
        if let Some(g) = &select.group_by {
            require(g.keyword_span.start, clause_sep.clone());
            for kw in layout::significant_within(ctx.tokens, g.keyword_span)
                .iter()
                .skip(1)
            {
                require(kw.start, " ".to_string());
            }
            if let Some(first) = g.items.first() {
                require(first.span().start, " ".to_string());
            }
            for pair in g.items.windows(2) {
                if let Some(comma) = layout::next_significant(ctx.tokens, pair[0].span().end) {
                    if comma.kind == TokenKind::Comma {
                        require(comma.start, String::new());
                    }
                }
                require(pair[1].span().start, " ".to_string());
            }
        }
        if let Some(h) = &select.having {
            require(h.keyword_span.start, clause_sep.clone());
        }
        if let Some(o) = &select.order_by {
            require(o.keyword_span.start, clause_sep.clone());
            for kw in layout::significant_within(ctx.tokens, o.keyword_span)
                .iter()
                .skip(1)
            {
                require(kw.start, " ".to_string());
            }
            if let Some(first) = o.items.first() {
                require(first.span.start, " ".to_string());
            }
            for pair in o.items.windows(2) {
                if let Some(comma) = layout::next_significant(ctx.tokens, pair[0].span.end) {
                    if comma.kind == TokenKind::Comma {
                        require(comma.start, String::new());
                    }
                }
                require(pair[1].span.start, " ".to_string());
            }
        }
        if let Some(l) = &select.limit {
            require(l.keyword_span.start, clause_sep.clone());
            require(l.count.span().start, " ".to_string());
            if let Some(off) = &l.offset {
                require(off.keyword_span.start, " ".to_string());
                require(off.value.span().start, " ".to_string());
            }
        }
        for op in &select.set_ops {
            require(op.keyword_span.start, clause_sep.clone());
            for kw in layout::significant_within(ctx.tokens, op.keyword_span)
                .iter()
                .skip(1)
            {
                require(kw.start, " ".to_string());
            }
            require(op.query.select_span.start, clause_sep.clone());
        }

        let edits = layout::diff_gaps(ctx, &gaps);
        if edits.is_empty() {
            return None;
        }
        let message = if items.len() > self.max_inline_columns {
            "Select items belong one per line, with clause keywords starting their own lines."
        } else if clause_sep == " " {
            "Keep this select on one line with single spaces."
        } else {
            "Clause keywords belong at the start of their own lines."
        };
        Some(
            Violation::warning(rule_codes::STYLE_LT_001, message)
                .with_span(ctx.abs(select.select_span))
                .with_fix(Fix::new(rule_codes::STYLE_LT_001, edits)),
        )
    }

    /// A select that starts mid-line keeps its surroundings; only item
    /// separation is checked, and without a fix.
    fn check_mid_line(&self, select: &SelectStatement, ctx: &RuleContext<'_>) -> Option<Violation> {
        if select.items.len() <= self.max_inline_columns {
            return None;
        }
        let split = select.items.iter().skip(1).all(|item| {
            layout::gap_before(ctx.tokens, item.span.start)
                .is_some_and(|gap| ctx.slice(gap).contains('\n'))
        });
        if split {
            return None;
        }
        Some(
            Violation::warning(
                rule_codes::STYLE_LT_001,
                "Select items belong one per line, with clause keywords starting their own lines.",
            )
            .with_span(ctx.abs(select.select_span)),
        )
    }
}

impl Default for SelectLayoutRule {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

impl StyleRule for SelectLayoutRule {
    fn code(&self) -> &'static str {
        rule_codes::STYLE_LT_001
    }

    fn name(&self) -> &'static str {
        "select-layout"
    }

    fn description(&self) -> &'static str {
        "Multi-column selects list one item per line with trailing commas."
    }

    fn check(
        &self,
        statement: &Statement,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut arm_starts = HashSet::new();
        walk_selects(statement, &mut |select| {
            for op in &select.set_ops {
                arm_starts.insert(op.query.select_span.start);
            }
        });
        let mut violations = Vec::new();
        walk_selects(statement, &mut |select| {
            let is_set_arm = arm_starts.contains(&select.select_span.start);
            violations.extend(self.check_select(select, ctx, is_set_arm));
        });
        Ok(violations)
    }
}
