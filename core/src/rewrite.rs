#![deny(missing_docs)]

//! # Rewrite Pipeline
//!
//! Wires the stages together for one source file:
//! parse, extract directives, plan edits, apply the plan.

use crate::directive::extract_directives;
use crate::edit::apply_str;
use crate::error::AppResult;
use crate::options::Options;
use crate::parser::parse_go;
use crate::plan::build_plan;
use log::debug;

/// The outcome of rewriting one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The rewritten source. Identical to the input when nothing applied.
    pub output: String,
    /// Number of directives found.
    pub directives: usize,
    /// Number of edits applied.
    pub edits: usize,
    /// Number of directives dropped as malformed.
    pub dropped: usize,
    /// Whether `output` differs from the input.
    pub changed: bool,
}

/// Rewrites `source` according to the directives it carries.
///
/// Parse errors and invalid edit plans are fatal. Malformed directives are
/// skipped and counted in [`Rewrite::dropped`].
///
/// # Examples
/// ```
/// use goinject_core::{rewrite_source, Options};
///
/// let source = "package pb\n\ntype URL struct {\n\t// @inject_tag: valid:\"http|https\"\n\tScheme string `json:\"scheme\"`\n}\n";
/// let rewrite = rewrite_source(source, &Options::default()).unwrap();
/// assert!(rewrite.output.contains("`json:\"scheme\" valid:\"http|https\"`"));
/// assert_eq!(rewrite.edits, 1);
/// ```
pub fn rewrite_source(source: &str, options: &Options) -> AppResult<Rewrite> {
    // 1. Parse
    let file = parse_go(source)?;

    // 2. Extract
    let extraction = extract_directives(&file, options);
    for directive in &extraction.directives {
        debug!(
            kind:% = directive.kind,
            decl = directive.owner_decl.as_str(),
            field:? = directive.owner_field,
            payload = directive.payload.as_str();
            "Found directive"
        );
    }

    // 3. Plan
    let planned = build_plan(source, &file, &extraction.directives, options);
    for edit in planned.plan.iter() {
        debug!(
            span:% = edit.span,
            insertion = edit.is_insertion(),
            replacement:? = edit.replacement;
            "Planned edit"
        );
    }

    // 4. Apply
    let output = apply_str(source, &planned.plan)?;
    let changed = output != source;

    Ok(Rewrite {
        output,
        directives: extraction.directives.len(),
        edits: planned.plan.len(),
        dropped: extraction.dropped + planned.dropped,
        changed,
    })
}
