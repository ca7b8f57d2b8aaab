//! Layout suggestion construction
//!
//! Every layout in the schema becomes one suggestion, in schema order. The
//! host only decides how to draw them; label, filter text and inserted text
//! are derived from the same canonical string so filtering and display never
//! disagree.

use tracing::debug;

use crate::schema::{effective_globals, LayoutEntry, Schema};

use super::context::{detect_trigger, ReplaceSpan};
use super::render;

/// A host-independent completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// `data-layout="<name>"`
    pub label: String,
    /// One-line layout description
    pub description: String,
    /// Specific and global attribute summaries
    pub detail: String,
    /// Markdown for the detail panel
    pub documentation: String,
    /// Snippet with the layout name as its only placeholder
    pub insert_text: String,
    pub replace: ReplaceSpan,
    pub filter_text: String,
    pub preselect: bool,
    pub sort_key: String,
}

/// The canonical `data-layout="<name>"` form.
pub fn canonical_label(name: &str) -> String {
    format!("data-layout=\"{}\"", name)
}

/// Snippet inserting the canonical form with the name as tab stop 1.
pub fn snippet(name: &str) -> String {
    format!("data-layout=\"${{1:{}}}\"", escape_snippet_placeholder(name))
}

/// Sort key ranking layout suggestions before any other source, in schema order.
///
/// The index is zero-padded to the width of the largest index among `count`
/// layouts (at least 5 digits), so keys of one list compare in index order.
pub fn sort_key(index: usize, count: usize, name: &str) -> String {
    let width = count.saturating_sub(1).to_string().len().max(5);
    format!("\u{0}{:0width$}{}", index, name, width = width)
}

fn escape_snippet_placeholder(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compute suggestions for the cursor described by `line_prefix` (cursor line
/// up to the cursor) and `text_before_cursor` (whole document up to the
/// cursor). Returns `None` when the cursor is not at a suggestion point.
pub fn provide_suggestions(
    line_prefix: &str,
    text_before_cursor: &str,
    schema: &Schema,
) -> Option<Vec<Suggestion>> {
    let context = detect_trigger(line_prefix, text_before_cursor, schema)?;

    debug!(
        "Layout completion for prefix '{}' at {:?} (active layout: {:?})",
        context.prefix,
        context.span,
        context.active_layout.map(|layout| layout.name.as_str())
    );

    Some(
        schema
            .layouts
            .iter()
            .enumerate()
            .map(|(index, layout)| build_suggestion(index, layout, schema, context.span))
            .collect(),
    )
}

fn build_suggestion(index: usize, layout: &LayoutEntry, schema: &Schema, span: ReplaceSpan) -> Suggestion {
    let label = canonical_label(&layout.name);
    let globals = effective_globals(schema, layout);

    Suggestion {
        filter_text: label.clone(),
        description: render::short_description(layout),
        detail: format!(
            "Attributes: {} | Globals: {}",
            render::attributes_summary(&layout.attributes),
            render::globals_summary(&globals)
        ),
        documentation: render::documentation(layout, &globals),
        insert_text: snippet(&layout.name),
        replace: span,
        preselect: true,
        sort_key: sort_key(index, schema.layouts.len(), &layout.name),
        label,
    }
}
