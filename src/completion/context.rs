//! Trigger detection for layout completion
//!
//! Decides, from raw text alone, whether the cursor sits where a
//! `data-layout` suggestion makes sense. There is no markup parser here:
//! the tag-boundary and quote checks are heuristics that can be fooled by
//! `<`, `>` or quotes inside text content. They are tuned to miss a
//! suggestion rather than offer one inside an attribute value.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::schema::{LayoutEntry, Schema};

/// A `data...` token at the end of the line, optionally followed by `=` and
/// a just-typed quote.
static PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(data[A-Za-z0-9-]*=?)(["']?)$"#).expect("valid prefix pattern"));

static ACTIVE_LAYOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-layout=["']?([\w-]+)["']?"#).expect("valid layout pattern"));

/// Where and what to replace when a suggestion is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSpan {
    /// First replaced column (characters from the start of the line)
    pub start: u32,
    /// Cursor column
    pub end: u32,
}

/// Result of a successful trigger check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext<'a> {
    /// The typed `data...` token, without a trailing quote
    pub prefix: String,
    /// Covers the prefix and any just-typed quote
    pub span: ReplaceSpan,
    /// Layout already named by `data-layout=` in the current tag
    pub active_layout: Option<&'a LayoutEntry>,
}

/// Run all gates. Returns `None` when no suggestion should be offered.
///
/// `line_prefix` is the cursor line up to the cursor; `text_before_cursor`
/// is the whole document up to the cursor.
pub fn detect_trigger<'a>(
    line_prefix: &str,
    text_before_cursor: &str,
    schema: &'a Schema,
) -> Option<TriggerContext<'a>> {
    let (prefix, matched_len) = match_prefix(line_prefix)?;

    let Some(tag) = open_tag_text(text_before_cursor) else {
        trace!("'{}' is not inside an open tag", prefix);
        return None;
    };

    if inside_quoted_value(tag) {
        trace!("'{}' is inside a quoted attribute value", prefix);
        return None;
    }

    let active_layout = active_layout_name(tag).and_then(|name| schema.layout(name));

    let end = line_prefix.chars().count() as u32;
    Some(TriggerContext {
        prefix,
        span: ReplaceSpan {
            start: end - matched_len,
            end,
        },
        active_layout,
    })
}

/// Step 1: the `data...` token before the cursor and the length, in
/// characters, of the whole match including a trailing quote.
pub fn match_prefix(line_prefix: &str) -> Option<(String, u32)> {
    let captures = PREFIX_PATTERN.captures(line_prefix)?;
    let whole = captures.get(0)?;
    let token = captures.get(1)?;
    Some((token.as_str().to_string(), whole.as_str().chars().count() as u32))
}

/// Step 2: text from the last `<` to the cursor, if that tag is still open.
pub fn open_tag_text(text_before_cursor: &str) -> Option<&str> {
    let last_open = text_before_cursor.rfind('<')?;
    match text_before_cursor.rfind('>') {
        Some(last_close) if last_close > last_open => None,
        _ => Some(&text_before_cursor[last_open..]),
    }
}

/// Step 3: odd quote parity means an unterminated attribute value, unless
/// the quote was the very last character typed.
pub fn inside_quoted_value(tag_text: &str) -> bool {
    let singles = tag_text.matches('\'').count();
    let doubles = tag_text.matches('"').count();
    if singles % 2 == 0 && doubles % 2 == 0 {
        return false;
    }
    !matches!(tag_text.chars().last(), Some('"' | '\''))
}

/// Step 4: the value of the first `data-layout=` in the tag.
pub fn active_layout_name(tag_text: &str) -> Option<&str> {
    ACTIVE_LAYOUT_PATTERN
        .captures(tag_text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}
