//! Structured auto-fixes and their application.
//!
//! A fix is a set of byte-range edits in source coordinates. Each format
//! pass gathers the edits from every violation, drops exact duplicates,
//! refuses overlapping edits outright, and applies the rest from the end of
//! the text backwards so earlier offsets stay valid.

use crate::error::ConflictError;
use crate::violation::{Span, Violation};

/// Hard cap on format passes before the engine declares the rule set
/// unstable.
pub(crate) const FIX_PASS_LIMIT: usize = 8;

/// One text edit: replace the bytes in `span` with `replacement`.
///
/// An empty span is an insertion point. An empty replacement over a
/// non-empty span is a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::new(at, at),
            replacement: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self {
            span,
            replacement: String::new(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// A named group of edits produced by one rule for one violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Code of the rule that produced the edits.
    pub rule: String,
    pub edits: Vec<Edit>,
}

impl Fix {
    pub fn new(rule: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            rule: rule.into(),
            edits,
        }
    }

    /// A fix consisting of a single edit.
    pub fn single(rule: impl Into<String>, edit: Edit) -> Self {
        Self::new(rule, vec![edit])
    }
}

/// An edit scheduled for application, tagged with its originating rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedEdit {
    pub rule: String,
    pub edit: Edit,
}

/// Gather the edits carried by `violations` into a conflict-free plan.
///
/// Identical edits (same span, same replacement) from different rules
/// collapse into one. Overlapping edits, and distinct insertions at the
/// same point, abort with [`ConflictError::Overlap`].
pub(crate) fn plan_edits(violations: &[Violation]) -> Result<Vec<PlannedEdit>, ConflictError> {
    let mut planned = Vec::new();
    for violation in violations {
        if let Some(fix) = &violation.fix {
            for edit in &fix.edits {
                planned.push(PlannedEdit {
                    rule: fix.rule.clone(),
                    edit: edit.clone(),
                });
            }
        }
    }
    planned.sort_by(|a, b| {
        (a.edit.span.start, a.edit.span.end, &a.edit.replacement).cmp(&(
            b.edit.span.start,
            b.edit.span.end,
            &b.edit.replacement,
        ))
    });
    planned.dedup_by(|a, b| a.edit == b.edit);

    // Scan in span order, remembering the edit reaching furthest right.
    let mut furthest: Option<usize> = None;
    for i in 0..planned.len() {
        if let Some(j) = furthest {
            let prev_span = planned[j].edit.span;
            let cur_span = planned[i].edit.span;
            let conflicting = cur_span.overlaps(&prev_span)
                || (cur_span == prev_span && cur_span.is_empty());
            if conflicting {
                return Err(ConflictError::Overlap {
                    first: planned[j].rule.clone(),
                    second: planned[i].rule.clone(),
                    start: prev_span.start.min(cur_span.start),
                    end: prev_span.end.max(cur_span.end),
                });
            }
            if cur_span.end > prev_span.end {
                furthest = Some(i);
            }
        } else {
            furthest = Some(i);
        }
    }
    Ok(planned)
}

/// Apply a conflict-free plan to `source`.
///
/// Edits apply from the highest offset down, so each `replace_range` leaves
/// the offsets of the edits still to come untouched. An insertion at the
/// start of a replaced range ends up before the replacement text.
pub(crate) fn apply_edits(source: &str, plan: &[PlannedEdit]) -> String {
    let mut ordered: Vec<&PlannedEdit> = plan.iter().collect();
    ordered.sort_by(|a, b| {
        (b.edit.span.start, b.edit.span.end).cmp(&(a.edit.span.start, a.edit.span.end))
    });
    let mut text = source.to_string();
    for planned in ordered {
        text.replace_range(
            planned.edit.span.start..planned.edit.span.end,
            &planned.edit.replacement,
        );
    }
    text
}
