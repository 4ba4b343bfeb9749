#![deny(missing_docs)]

//! # Edit Plans
//!
//! An [`EditPlan`] is the complete list of byte-range replacements for one file,
//! kept sorted by descending start offset. [`apply`] replays it against the
//! original buffer from the highest offset down, so every edit still sees the
//! offsets it was computed against.

use crate::error::{AppError, AppResult};
use crate::span::Span;
use std::cmp::Reverse;

/// One replacement of `span` in the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSpan {
    /// The replaced range. Zero-width for insertions.
    pub span: Span,
    /// The text written in place of the range.
    pub replacement: String,
    seq: usize,
}

impl EditSpan {
    /// Whether the edit only inserts text.
    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }

    fn key(&self) -> (Reverse<usize>, Reverse<usize>, Reverse<usize>) {
        (
            Reverse(self.span.start),
            Reverse(self.span.end),
            Reverse(self.seq),
        )
    }
}

/// Edits for one file, ordered by descending start, then descending end,
/// then reverse insertion order.
///
/// Insertions sharing an offset therefore end up in the order they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    edits: Vec<EditSpan>,
    pushed: usize,
}

impl EditPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a replacement of `span`.
    pub fn replace(&mut self, span: Span, replacement: impl Into<String>) {
        let edit = EditSpan {
            span,
            replacement: replacement.into(),
            seq: self.pushed,
        };
        self.pushed += 1;

        let key = edit.key();
        let at = self.edits.partition_point(|e| e.key() < key);
        self.edits.insert(at, edit);
    }

    /// Adds an insertion at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(Span::point(offset), text);
    }

    /// Adds a deletion of `span`.
    pub fn delete(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    /// Iterates the edits in application order (highest offset first).
    pub fn iter(&self) -> impl Iterator<Item = &EditSpan> {
        self.edits.iter()
    }

    /// Number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Check if the plan has no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Checks every span against a buffer of `len` bytes and rejects overlaps.
    pub fn validate(&self, len: usize) -> AppResult<()> {
        for edit in &self.edits {
            if edit.span.start > edit.span.end || edit.span.end > len {
                return Err(AppError::Edit(format!(
                    "span {} is out of bounds for {} bytes",
                    edit.span, len
                )));
            }
        }

        for pair in self.edits.windows(2) {
            let (higher, lower) = (&pair[0], &pair[1]);
            if lower.span.end > higher.span.start {
                return Err(AppError::Edit(format!(
                    "span {} overlaps span {}",
                    lower.span, higher.span
                )));
            }
        }

        Ok(())
    }
}

/// Applies `plan` to `original`, producing the rewritten buffer.
///
/// The plan is validated first; on error nothing is produced.
///
/// # Examples
/// ```
/// use goinject_core::edit::{apply, EditPlan};
/// use goinject_core::span::Span;
///
/// let mut plan = EditPlan::new();
/// plan.replace(Span::new(0, 5), "Hi");
/// plan.insert(11, "!");
/// assert_eq!(apply(b"Hello world", &plan).unwrap(), b"Hi world!".to_vec());
/// ```
pub fn apply(original: &[u8], plan: &EditPlan) -> AppResult<Vec<u8>> {
    plan.validate(original.len())?;

    let mut buffer = original.to_vec();
    for edit in plan.iter() {
        buffer.splice(edit.span.range(), edit.replacement.bytes());
    }
    Ok(buffer)
}

/// [`apply`] for text: every span must also fall on a character boundary.
pub fn apply_str(original: &str, plan: &EditPlan) -> AppResult<String> {
    for edit in plan.iter() {
        let Span { start, end } = edit.span;
        if end <= original.len()
            && !(original.is_char_boundary(start) && original.is_char_boundary(end))
        {
            return Err(AppError::Edit(format!(
                "span {} splits a UTF-8 character",
                edit.span
            )));
        }
    }

    let bytes = apply(original.as_bytes(), plan)?;
    String::from_utf8(bytes).map_err(|e| AppError::Edit(format!("rewritten source is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Reference implementation: ascending order, shifting later offsets as it goes.
    fn apply_ascending(original: &str, edits: &[(usize, usize, &str)]) -> String {
        let mut sorted: Vec<_> = edits.iter().enumerate().collect();
        sorted.sort_by_key(|(seq, (start, end, _))| (*start, *end, *seq));

        let mut out = original.to_string();
        let mut shift: isize = 0;
        for (_, (start, end, text)) in sorted {
            let s = (*start as isize + shift) as usize;
            let e = (*end as isize + shift) as usize;
            out.replace_range(s..e, text);
            shift += text.len() as isize - (*end as isize - *start as isize);
        }
        out
    }

    fn plan_of(edits: &[(usize, usize, &str)]) -> EditPlan {
        let mut plan = EditPlan::new();
        for (start, end, text) in edits {
            plan.replace(Span::new(*start, *end), *text);
        }
        plan
    }

    #[test]
    fn test_plan_is_sorted_descending() {
        let plan = plan_of(&[(0, 1, "a"), (10, 12, "b"), (5, 5, "c"), (10, 10, "d")]);
        let starts: Vec<_> = plan.iter().map(|e| (e.span.start, e.span.end)).collect();
        assert_eq!(starts, vec![(10, 12), (10, 10), (5, 5), (0, 1)]);
    }

    #[test]
    fn test_descending_matches_ascending() {
        let source = "type A struct { X int `a` ; Y int `b` ; Z int `c` }";
        let edits = [
            (22, 25, "`a:\"1\" longer:\"value\"`"),
            (35, 38, "``"),
            (47, 50, "`c:\"3\"`"),
            (51, 51, "\n\nfunc (*A) TableName() string { return \"a\" }"),
            (0, 0, "// header\n"),
        ];
        let plan = plan_of(&edits);
        let out = apply_str(source, &plan).unwrap();
        assert_eq!(out, apply_ascending(source, &edits));
    }

    #[test]
    fn test_insertions_at_same_offset_keep_push_order() {
        let mut plan = EditPlan::new();
        plan.insert(3, "1");
        plan.insert(3, "2");
        plan.insert(3, "3");
        assert_eq!(apply_str("abcdef", &plan).unwrap(), "abc123def");
    }

    #[test]
    fn test_insertion_before_replacement_at_same_start() {
        let mut plan = EditPlan::new();
        plan.replace(Span::new(2, 4), "XY");
        plan.insert(2, "_");
        assert_eq!(apply_str("abcdef", &plan).unwrap(), "ab_XYef");
    }

    #[test]
    fn test_insertions_are_zero_width() {
        let mut plan = EditPlan::new();
        plan.replace(Span::new(2, 4), "XY");
        plan.insert(2, "_");
        plan.replace(Span::new(5, 5), "");
        let kinds: Vec<_> = plan.iter().map(|e| (e.span.start, e.is_insertion())).collect();
        assert_eq!(kinds, vec![(5, true), (2, false), (2, true)]);
    }

    #[test]
    fn test_overlap_rejected() {
        let plan = plan_of(&[(2, 6, "x"), (4, 8, "y")]);
        let err = apply(b"0123456789", &plan).unwrap_err();
        assert!(matches!(err, AppError::Edit(_)));

        let plan = plan_of(&[(2, 6, "x"), (4, 4, "y")]);
        assert!(apply(b"0123456789", &plan).is_err());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let plan = plan_of(&[(8, 12, "x")]);
        assert!(matches!(apply(b"0123456789", &plan), Err(AppError::Edit(_))));

        let plan = plan_of(&[(6, 4, "x")]);
        assert!(matches!(apply(b"0123456789", &plan), Err(AppError::Edit(_))));
    }

    #[test]
    fn test_char_boundary_rejected() {
        let plan = plan_of(&[(1, 2, "x")]);
        assert!(matches!(apply_str("é", &plan), Err(AppError::Edit(_))));
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let source = "package pb\n";
        assert_eq!(apply_str(source, &EditPlan::new()).unwrap(), source);
    }
}
