use ropey::{Rope, RopeSlice};

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::completion::EditEvent;

pub use crate::lsp::models::{LspDocument, LspDocumentState};

/// Converts an LSP position (UTF-16 code units) to a char index in the Rope,
/// clamped to the document.
fn position_to_char_index(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let content = line_content(text, line);
    let unit = (position.character as usize).min(content.len_utf16_cu());
    text.line_to_char(line) + content.utf16_cu_to_char(unit)
}

/// `line` without its line break.
fn line_content(text: &Rope, line: usize) -> RopeSlice<'_> {
    let slice = text.line(line);
    let mut len = slice.len_chars();
    while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
        len -= 1;
    }
    slice.slice(..len)
}

/// UTF-16 column of the char column `column` in `line`.
pub fn utf16_column(line: &str, column: u32) -> u32 {
    line.chars()
        .take(column as usize)
        .map(char::len_utf16)
        .sum::<usize>() as u32
}

/// An insertion made earlier in the batch, tracked by absolute char offset.
struct Insertion {
    offset: usize,
    len: usize,
    text: String,
}

impl LspDocumentState {
    /// Applies a list of content changes to the document state.
    ///
    /// Returns the insertions made by ranged changes, positioned in the
    /// document as it stands after the whole batch, or an error if the
    /// version is not newer. Insertions overwritten by a later change of the
    /// same batch are dropped.
    pub fn apply(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Result<Vec<EditEvent>, String> {
        if version <= self.version {
            return Err(format!("Version {} not newer than {}", version, self.version));
        }
        let mut insertions: Vec<Insertion> = Vec::new();
        for change in changes {
            let Some(range) = change.range else {
                self.text = Rope::from_str(&change.text);
                insertions.clear();
                continue;
            };

            let start = position_to_char_index(&range.start, &self.text);
            let end = position_to_char_index(&range.end, &self.text).max(start);
            let inserted = change.text.chars().count();

            insertions.retain_mut(|earlier| {
                if earlier.offset + earlier.len <= start {
                    true
                } else if earlier.offset >= end {
                    earlier.offset = earlier.offset - (end - start) + inserted;
                    true
                } else {
                    false
                }
            });

            self.text.remove(start..end);
            self.text.insert(start, &change.text);
            if inserted > 0 {
                insertions.push(Insertion {
                    offset: start,
                    len: inserted,
                    text: change.text,
                });
            }
        }
        self.version = version;

        Ok(insertions
            .into_iter()
            .map(|insertion| {
                let line = self.text.char_to_line(insertion.offset);
                let column = insertion.offset - self.text.line_to_char(line);
                EditEvent::new(line as u32, column as u32, insertion.text)
            })
            .collect())
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: u32) -> Option<String> {
        let line = line as usize;
        if line >= self.text.len_lines() {
            return None;
        }
        Some(line_content(&self.text, line).to_string())
    }

    /// The cursor line up to `position`.
    pub fn line_prefix(&self, position: &Position) -> Option<String> {
        let line = position.line as usize;
        if line >= self.text.len_lines() {
            return None;
        }
        let start = self.text.line_to_char(line);
        let end = position_to_char_index(position, &self.text);
        Some(self.text.slice(start..end).to_string())
    }

    /// The whole document up to `position`.
    pub fn text_before(&self, position: &Position) -> String {
        let end = position_to_char_index(position, &self.text);
        self.text.slice(..end).to_string()
    }

    /// The whole document from `position` on.
    pub fn text_after(&self, position: &Position) -> String {
        let start = position_to_char_index(position, &self.text);
        self.text.slice(start..).to_string()
    }
}

impl LspDocument {
    pub fn new(id: u32, uri: Url, language_id: String, text: &str, version: i32) -> Self {
        Self {
            id,
            state: tokio::sync::RwLock::new(LspDocumentState {
                uri,
                language_id,
                text: Rope::from_str(text),
                version,
            }),
        }
    }
}
