//! Proactive suggestion trigger
//!
//! Some clients do not reopen the completion widget after typing `-` or a
//! quote. The watcher inspects each batch of edits and asks the client to
//! open it when the author has just typed `data-`. It is a pure function of
//! the edits and the resulting line text; sending the request is the
//! caller's business.

use once_cell::sync::Lazy;
use regex::Regex;

static DATA_DASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bdata-["']?$"#).expect("valid trigger pattern"));

/// A single text insertion, positioned in the document after the batch was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    pub line: u32,
    /// Column (in characters) where the text was inserted
    pub character: u32,
    pub inserted: String,
}

impl EditEvent {
    pub fn new(line: u32, character: u32, inserted: impl Into<String>) -> Self {
        Self {
            line,
            character,
            inserted: inserted.into(),
        }
    }
}

/// Request for the client to open its suggestion widget at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenCommand;

/// Check a batch of edits. `line_text` returns the current text of a line.
///
/// Yields at most one command per batch, however many edits qualify.
pub fn check_edits<F>(edits: &[EditEvent], line_text: F) -> Option<ReopenCommand>
where
    F: Fn(u32) -> Option<String>,
{
    edits
        .iter()
        .any(|edit| {
            is_trigger_character(&edit.inserted)
                && line_text(edit.line)
                    .map(|line| {
                        let upto: String = line
                            .chars()
                            .take(edit.character as usize + edit.inserted.chars().count())
                            .collect();
                        DATA_DASH_PATTERN.is_match(&upto)
                    })
                    .unwrap_or(false)
        })
        .then_some(ReopenCommand)
}

fn is_trigger_character(inserted: &str) -> bool {
    matches!(inserted, "-" | "\"" | "'")
}
