use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use tokio::sync::RwLock;

use tower_lsp::Client;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemLabelDetails, CompletionTextEdit,
    Documentation, Hover, HoverContents, InsertTextFormat, MarkupContent, MarkupKind,
    Position, Range, TextEdit, Url,
};

use tracing::{debug, info, warn};

use crate::completion::{self, Suggestion};
use crate::lsp::config::ServerConfig;
use crate::lsp::document::utf16_column;
use crate::lsp::models::LspDocument;
use crate::lsp::requests::TriggerSuggest;
use crate::schema::Schema;

mod handlers;
mod state;

pub use state::LayoutBackend;

impl LayoutBackend {
    /// Creates a backend serving `schema` to `client`.
    pub fn new(client: Client, schema: Arc<Schema>, config: ServerConfig) -> Self {
        info!(
            "Serving {} layouts for languages {:?}",
            schema.layouts.len(),
            config.languages
        );
        Self {
            client,
            schema,
            config: Arc::new(RwLock::new(config)),
            documents_by_uri: Arc::new(DashMap::new()),
            serial_document_id: Arc::new(AtomicU32::new(0)),
        }
    }

    fn next_document_id(&self) -> u32 {
        self.serial_document_id.fetch_add(1, Ordering::SeqCst)
    }

    fn document(&self, uri: &Url) -> Option<Arc<LspDocument>> {
        self.documents_by_uri.get(uri).map(|r| r.value().clone())
    }

    /// Snapshot of the current configuration.
    pub async fn config(&self) -> ServerConfig {
        self.config.read().await.clone()
    }

    /// Number of tracked documents.
    pub fn document_count(&self) -> usize {
        self.documents_by_uri.len()
    }

    /// Layout completion items at `position`, or `None` when the cursor is
    /// not at a suggestion point.
    pub(crate) async fn completion_items(
        &self,
        document: &LspDocument,
        position: Position,
    ) -> Option<Vec<CompletionItem>> {
        let state = document.state.read().await;
        let line_prefix = state.line_prefix(&position)?;
        let text_before = state.text_before(&position);
        drop(state);

        let suggestions = completion::provide_suggestions(&line_prefix, &text_before, &self.schema)?;
        Some(
            suggestions
                .into_iter()
                .map(|suggestion| to_completion_item(suggestion, position.line, &line_prefix))
                .collect(),
        )
    }

    /// Layout documentation for the tag around `position`.
    pub(crate) async fn hover_at(&self, document: &LspDocument, position: Position) -> Option<Hover> {
        let state = document.state.read().await;
        let text_before = state.text_before(&position);
        let text_after = state.text_after(&position);
        drop(state);

        let (layout, markdown) = completion::layout_documentation_at(&text_before, &text_after, &self.schema)?;
        debug!("Hover documentation for layout '{}'", layout.name);
        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: markdown,
            }),
            range: None,
        })
    }

    /// Ask the client to reopen its suggestion widget without waiting for
    /// the answer. Failures are logged only.
    pub(crate) fn request_suggestions(&self, uri: &Url) {
        let client = self.client.clone();
        let uri = uri.clone();
        tokio::spawn(async move {
            match client.send_request::<TriggerSuggest>(()).await {
                Ok(_) => debug!("Client reopened suggestions for {}", uri),
                Err(e) => warn!("Client declined to reopen suggestions for {}: {}", uri, e),
            }
        });
    }
}

/// Map an engine suggestion to an LSP completion item on `line`.
///
/// The engine counts columns in chars of `line_prefix`; the LSP range is in
/// UTF-16 code units.
pub fn to_completion_item(suggestion: Suggestion, line: u32, line_prefix: &str) -> CompletionItem {
    let range = Range {
        start: Position { line, character: utf16_column(line_prefix, suggestion.replace.start) },
        end: Position { line, character: utf16_column(line_prefix, suggestion.replace.end) },
    };
    CompletionItem {
        label: suggestion.label,
        label_details: Some(CompletionItemLabelDetails {
            detail: None,
            description: Some(suggestion.description),
        }),
        kind: Some(CompletionItemKind::PROPERTY),
        detail: Some(suggestion.detail),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: suggestion.documentation,
        })),
        preselect: Some(suggestion.preselect),
        sort_text: Some(suggestion.sort_key),
        filter_text: Some(suggestion.filter_text),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: suggestion.insert_text,
        })),
        ..Default::default()
    }
}
