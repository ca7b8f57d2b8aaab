//! Layout documentation on hover
//!
//! Reuses the active-layout detection: when the hovered position lies in an
//! open tag that already carries `data-layout="<name>"` for a known layout,
//! the long-form documentation of that layout is shown.

use crate::schema::{effective_globals, LayoutEntry, Schema};

use super::context::{active_layout_name, open_tag_text};
use super::provider::canonical_label;
use super::render;

/// Documentation for the layout named by the tag around the position.
///
/// `text_before` is the document up to the position and `text_after` the
/// rest of it.
pub fn layout_documentation_at<'a>(
    text_before: &str,
    text_after: &str,
    schema: &'a Schema,
) -> Option<(&'a LayoutEntry, String)> {
    let head = open_tag_text(text_before)?;
    let tail = match text_after.find(['<', '>']) {
        Some(end) => &text_after[..end],
        None => text_after,
    };

    let tag = format!("{}{}", head, tail);
    let layout = schema.layout(active_layout_name(&tag)?)?;
    Some((layout, layout_documentation(layout, schema)))
}

/// Markdown heading, description and sections for one layout.
pub fn layout_documentation(layout: &LayoutEntry, schema: &Schema) -> String {
    let globals = effective_globals(schema, layout);
    format!(
        "### `{}`\n\n{}\n\n{}",
        canonical_label(&layout.name),
        render::short_description(layout),
        render::documentation(layout, &globals)
    )
}
