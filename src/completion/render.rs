//! Text rendering for layout suggestions
//!
//! Schema text is free-form and often multi-line; everything shown in a
//! completion row or the documentation panel goes through
//! [`collapse_whitespace`] first so one long description cannot blow up the
//! widget.

use crate::schema::{AttributeDescriptor, AttributeEntry, AttributeList, EffectiveGlobalSet, LayoutEntry};

/// Maximum characters of the one-line layout description.
pub const DESCRIPTION_MAX_CHARS: usize = 120;

/// Maximum characters of an attribute summary.
pub const SUMMARY_MAX_CHARS: usize = 100;

const ELLIPSIS: char = '…';

/// Shown for an empty attribute section.
pub const NONE_MARKER: &str = "none";

/// Replace every run of whitespace (newlines included) with one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, ending with `…` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push(ELLIPSIS);
    truncated
}

/// `name="value"`, or just `name` without an example value.
pub fn render_descriptor(descriptor: &AttributeDescriptor) -> String {
    match descriptor.value.as_deref() {
        Some(value) => format!("{}=\"{}\"", descriptor.name, collapse_whitespace(value)),
        None => descriptor.name.clone(),
    }
}

/// Like [`render_descriptor`], with ` (default: ...)` when a default exists.
pub fn render_global_descriptor(descriptor: &AttributeDescriptor) -> String {
    let rendered = render_descriptor(descriptor);
    match descriptor.default_value.as_deref() {
        Some(default) => format!("{} (default: {})", rendered, collapse_whitespace(default)),
        None => rendered,
    }
}

pub fn render_entry(entry: &AttributeEntry) -> String {
    match entry {
        AttributeEntry::Descriptor(descriptor) => render_descriptor(descriptor),
        AttributeEntry::Raw(raw) => collapse_whitespace(raw),
    }
}

pub fn render_global_entry(entry: &AttributeEntry) -> String {
    match entry {
        AttributeEntry::Descriptor(descriptor) => render_global_descriptor(descriptor),
        AttributeEntry::Raw(raw) => collapse_whitespace(raw),
    }
}

/// One-line layout description for the completion row.
pub fn short_description(layout: &LayoutEntry) -> String {
    truncate(&collapse_whitespace(layout.display_label()), DESCRIPTION_MAX_CHARS)
}

/// `; `-joined summary of a layout's specific attributes.
pub fn attributes_summary(list: &AttributeList) -> String {
    if list.is_empty() {
        return NONE_MARKER.to_string();
    }
    let summary = match list {
        AttributeList::Text(text) => text.clone(),
        AttributeList::Items(items) => items.iter().map(render_entry).collect::<Vec<_>>().join("; "),
    };
    truncate(&collapse_whitespace(&summary), SUMMARY_MAX_CHARS)
}

/// `; `-joined summary of the effective global attributes.
pub fn globals_summary(globals: &EffectiveGlobalSet) -> String {
    if globals.is_empty() {
        return NONE_MARKER.to_string();
    }
    let summary = globals
        .entries()
        .iter()
        .map(render_global_entry)
        .collect::<Vec<_>>()
        .join("; ");
    truncate(&summary, SUMMARY_MAX_CHARS)
}

/// Markdown documentation shown in the expandable detail panel.
pub fn documentation(layout: &LayoutEntry, globals: &EffectiveGlobalSet) -> String {
    let mut sections = Vec::with_capacity(4);

    if let Some(usage) = layout.usage.as_deref().filter(|usage| !usage.trim().is_empty()) {
        sections.push(format!("**Usage:** {}", collapse_whitespace(usage)));
    }

    sections.push(list_section("HTML-specific attributes", &layout.attributes, entry_bullet));
    sections.push(list_section("CSS-style properties", &layout.properties, entry_bullet));

    let global_lines: Vec<String> = globals.entries().iter().map(global_bullet).collect();
    sections.push(section("HTML global attributes", &global_lines));

    sections.join("\n\n")
}

fn list_section(title: &str, list: &AttributeList, bullet: fn(&AttributeEntry) -> String) -> String {
    match list {
        AttributeList::Text(text) if !list.is_empty() => format!("**{}:** {}", title, collapse_whitespace(text)),
        AttributeList::Text(_) => section(title, &[]),
        AttributeList::Items(items) => {
            let lines: Vec<String> = items.iter().map(bullet).collect();
            section(title, &lines)
        }
    }
}

fn section(title: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        format!("**{}:** _{}_", title, NONE_MARKER)
    } else {
        format!("**{}:**\n{}", title, lines.join("\n"))
    }
}

fn entry_bullet(entry: &AttributeEntry) -> String {
    match entry {
        AttributeEntry::Descriptor(descriptor) => bullet(render_descriptor(descriptor), descriptor),
        AttributeEntry::Raw(raw) => format!("- {}", collapse_whitespace(raw)),
    }
}

fn global_bullet(entry: &AttributeEntry) -> String {
    match entry {
        AttributeEntry::Descriptor(descriptor) => bullet(render_global_descriptor(descriptor), descriptor),
        AttributeEntry::Raw(raw) => format!("- {}", collapse_whitespace(raw)),
    }
}

fn bullet(rendered: String, descriptor: &AttributeDescriptor) -> String {
    match descriptor.description.as_deref().map(collapse_whitespace) {
        Some(description) if !description.is_empty() => format!("- `{}`: {}", rendered, description),
        _ => format!("- `{}`", rendered),
    }
}
