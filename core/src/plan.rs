#![deny(missing_docs)]

//! # Edit Planning
//!
//! Resolves directives to byte spans of the original source and builds the
//! [`EditPlan`] for one file.
//!
//! 1. **Tags**: every tag directive of a field is folded over the field's tag
//!    text, giving one replacement per field.
//! 2. **Struct synthesis**: validator, table-name accessor and marker stubs of a
//!    struct are inserted together right after its `type` declaration, past
//!    any line comment trailing it.
//! 3. **Interfaces**: marker interfaces are appended at the end of the file.
//! 4. **Import**: `regexp` is imported when a validator needs it.
//! 5. **Comment removal** (optional): applied directive comments are deleted.
//!
//! None of these spans overlap, so the plan's offset order alone decides how
//! they are applied.

use crate::codegen::{
    import_spec, marker_interface, marker_method_name, marker_stub, table_name_method,
    validator_method, ValidationRule, REGEXP_ALIAS, TABLE_NAME_METHOD, VALIDATE_METHOD,
};
use crate::directive::{Directive, DirectiveKind};
use crate::edit::EditPlan;
use crate::options::Options;
use crate::parser::comments::{is_blank, line_start};
use crate::parser::{ParsedFile, ParsedStruct};
use crate::span::Span;
use crate::tags::{merge, TagItems};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

const REGEXP_PATH: &str = "regexp";

/// The plan for one file plus bookkeeping about what could not be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Planned {
    /// The edits to apply.
    pub plan: EditPlan,
    /// Directives dropped because their payload or target was malformed.
    pub dropped: usize,
}

/// Struct-level work collected from the directives of one struct.
#[derive(Default)]
struct StructWork<'a> {
    validations: Vec<&'a Directive>,
    table: Option<&'a Directive>,
    interfaces: Vec<&'a Directive>,
}

/// Builds the edit plan for `directives`, resolved against `file` parsed from `source`.
pub fn build_plan(
    source: &str,
    file: &ParsedFile,
    directives: &[Directive],
    options: &Options,
) -> Planned {
    let mut planner = Planner {
        source,
        file,
        planned: Planned::default(),
        applied: Vec::new(),
    };

    planner.plan_tags(directives);
    let needs_regexp = planner.plan_structs(directives);
    planner.plan_interfaces(directives);
    if needs_regexp {
        planner.plan_regexp_import();
    }
    if options.remove_comments {
        planner.plan_comment_removal();
    }

    planner.planned
}

struct Planner<'a> {
    source: &'a str,
    file: &'a ParsedFile,
    planned: Planned,
    /// Comments of directives that were applied (or were already satisfied).
    applied: Vec<Span>,
}

impl<'a> Planner<'a> {
    fn plan_tags(&mut self, directives: &'a [Directive]) {
        let mut by_field: IndexMap<(&str, &str), Vec<&Directive>> = IndexMap::new();
        for directive in directives.iter().filter(|d| d.kind.edits_tag()) {
            if let Some(field) = directive.owner_field.as_deref() {
                by_field
                    .entry((directive.owner_decl.as_str(), field))
                    .or_default()
                    .push(directive);
            }
        }

        for ((decl, field_name), group) in by_field {
            let Some(field) = self
                .file
                .find_struct(decl)
                .and_then(|s| s.fields.iter().find(|f| f.name() == Some(field_name)))
            else {
                continue;
            };

            let Some(tag) = &field.tag else {
                debug!(decl, field = field_name; "Field has no tag literal, skipping");
                continue;
            };
            if !tag.raw {
                debug!(decl, field = field_name; "Field tag is not a raw string literal, skipping");
                continue;
            }
            if let Err(e) = TagItems::parse(&tag.text) {
                warn!(decl, field = field_name, error:% = e; "Existing tag is malformed, leaving it untouched");
                self.planned.dropped += group.len();
                continue;
            }

            let mut current = tag.text.clone();
            for directive in group {
                match merge(&current, &directive.payload) {
                    Ok(merged) if merged.contains('`') => {
                        warn!(decl, field = field_name, payload = directive.payload.as_str(); "Merged tag would contain a backtick, dropping directive");
                        self.planned.dropped += 1;
                    }
                    Ok(merged) => {
                        current = merged;
                        self.applied.extend(directive.comment);
                    }
                    Err(e) => {
                        warn!(decl, field = field_name, payload = directive.payload.as_str(), error:% = e; "Dropping directive with malformed tag payload");
                        self.planned.dropped += 1;
                    }
                }
            }

            if current != tag.text {
                debug!(decl, field = field_name, span:% = tag.span, tag = current.as_str(); "Resolved tag edit");
                self.planned.plan.replace(tag.span, format!("`{}`", current));
            }
        }
    }

    /// Returns whether any synthesized validator refers to the `regexp` package.
    fn plan_structs(&mut self, directives: &'a [Directive]) -> bool {
        let mut work: IndexMap<&str, StructWork<'a>> = IndexMap::new();
        for directive in directives.iter().filter(|d| !d.kind.edits_tag()) {
            let slot = work.entry(directive.owner_decl.as_str()).or_default();
            match directive.kind {
                DirectiveKind::Validation => slot.validations.push(directive),
                DirectiveKind::OrmTable => {
                    // Last table directive wins; earlier ones count as applied.
                    if let Some(previous) = slot.table.replace(directive) {
                        self.applied.extend(previous.comment);
                    }
                }
                DirectiveKind::Interface => slot.interfaces.push(directive),
                DirectiveKind::TagInject | DirectiveKind::SkipTags => {}
            }
        }

        let regexp = self.regexp_qualifier().unwrap_or(REGEXP_ALIAS).to_string();
        let mut needs_regexp = false;

        let file = self.file;
        for (decl, work) in work {
            let Some(item) = file.find_struct(decl) else {
                continue;
            };

            let mut pieces = Vec::new();

            if !work.validations.is_empty() {
                if let Some(code) = self.validator(item, &work.validations, &regexp) {
                    needs_regexp = true;
                    pieces.push(code);
                }
            }

            if let Some(table) = work.table {
                self.applied.extend(table.comment);
                if self.file.has_method(decl, TABLE_NAME_METHOD) {
                    debug!(decl; "TableName already defined, skipping");
                } else {
                    pieces.push(table_name_method(decl, &table.payload));
                }
            }

            let mut seen = IndexSet::new();
            for directive in work.interfaces {
                self.applied.extend(directive.comment);
                let method = marker_method_name(&directive.payload);
                if !seen.insert(method.clone()) || self.file.has_method(decl, &method) {
                    debug!(decl, method = method.as_str(); "Marker method already defined, skipping");
                    continue;
                }
                pieces.push(marker_stub(decl, &directive.payload));
            }

            if pieces.is_empty() {
                continue;
            }

            let text: String = pieces.iter().map(|p| format!("\n\n{}", p)).collect();
            let offset = synthesis_offset(self.source.as_bytes(), item.decl.end);
            debug!(decl, offset; "Resolved struct synthesis");
            self.planned.plan.insert(offset, text);
        }

        needs_regexp && self.regexp_qualifier().is_none()
    }

    fn validator(
        &mut self,
        item: &ParsedStruct,
        validations: &[&'a Directive],
        regexp: &str,
    ) -> Option<String> {
        self.applied
            .extend(validations.iter().filter_map(|d| d.comment));

        if self.file.has_method(&item.name, VALIDATE_METHOD) {
            debug!(decl = item.name.as_str(); "Validate already defined, skipping");
            return None;
        }

        let rules: Vec<ValidationRule<'_>> = validations
            .iter()
            .filter_map(|d| {
                Some(ValidationRule {
                    field: d.owner_field.as_deref()?,
                    pattern: &d.payload,
                })
            })
            .collect();

        Some(validator_method(&item.name, &rules, regexp))
    }

    fn plan_interfaces(&mut self, directives: &[Directive]) {
        let names: IndexSet<&str> = directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::Interface)
            .map(|d| d.payload.as_str())
            .collect();

        let decls: Vec<String> = names
            .into_iter()
            .filter(|name| {
                let exists = self.file.declares_type(name);
                if exists {
                    debug!(interface = *name; "Interface already declared, skipping");
                }
                !exists
            })
            .map(marker_interface)
            .collect();

        if decls.is_empty() {
            return;
        }

        let lead = if self.source.ends_with('\n') { "\n" } else { "\n\n" };
        let text = format!("{}{}\n", lead, decls.join("\n\n"));
        self.planned.plan.insert(self.source.len(), text);
    }

    fn plan_regexp_import(&mut self) {
        let spec = import_spec(REGEXP_ALIAS, REGEXP_PATH);

        let (offset, text) = match self.file.imports.last() {
            Some(last) if last.grouped => (last.spec.end, format!("\n\t{}", spec)),
            Some(last) => (last.decl.end, format!("\nimport {}", spec)),
            None => (
                self.file.package_clause.end,
                format!("\n\nimport {}", spec),
            ),
        };

        debug!(offset; "Resolved regexp import");
        self.planned.plan.insert(offset, text);
    }

    fn plan_comment_removal(&mut self) {
        let src = self.source.as_bytes();
        let mut spans = std::mem::take(&mut self.applied);
        spans.sort();
        spans.dedup();

        for comment in spans {
            let span = removal_span(src, comment);
            debug!(span:% = span; "Removing directive comment");
            self.planned.plan.delete(span);
        }
    }

    /// How the file already refers to the `regexp` package, if it imports it by name.
    fn regexp_qualifier(&self) -> Option<&'a str> {
        self.file
            .imports
            .iter()
            .filter(|i| i.path == REGEXP_PATH)
            .find_map(|i| i.qualifier())
    }
}

/// The whole line of an own-line comment (indentation and newline included),
/// or just the comment when it shares its line with code.
fn removal_span(src: &[u8], comment: Span) -> Span {
    let start = line_start(src, comment.start);
    if !is_blank(&src[start..comment.start]) {
        return comment;
    }

    let end = src[comment.end..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(src.len(), |i| comment.end + i + 1);
    if !is_blank(&src[comment.end..end]) {
        return comment;
    }

    Span::new(start, end)
}

/// Where code synthesized for a declaration ending at `decl_end` goes.
///
/// A line comment trailing the declaration stays on its line, so the code
/// follows it instead.
fn synthesis_offset(src: &[u8], decl_end: usize) -> usize {
    let eol = src[decl_end..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(src.len(), |i| decl_end + i);
    let rest = &src[decl_end..eol];
    let indent = rest
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t'))
        .unwrap_or(rest.len());
    if !rest[indent..].starts_with(b"//") {
        return decl_end;
    }
    if rest.ends_with(b"\r") {
        eol - 1
    } else {
        eol
    }
}
