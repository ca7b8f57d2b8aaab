//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` implementation for
//! the layout backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Completion and hover

use std::sync::Arc;

use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    CompletionList, CompletionOptions, CompletionOptionsCompletionItem, CompletionParams,
    CompletionResponse, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, info, trace, warn};

use crate::completion::check_edits;
use crate::lsp::models::LspDocument;

use super::state::LayoutBackend;

#[tower_lsp::async_trait]
impl LanguageServer for LayoutBackend {
    /// Handles the LSP initialize request, applying client options and advertising capabilities.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!(
            "Received initialize from {:?}",
            params.client_info.as_ref().map(|info| info.name.as_str())
        );

        let trigger_characters = {
            let mut config = self.config.write().await;
            *config = config.clone().apply_initialization_options(params.initialization_options);
            info!("Serving languages {:?}", config.languages);
            config.trigger_characters.clone()
        };

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(trigger_characters),
                    all_commit_characters: None,
                    resolve_provider: Some(false),
                    completion_item: Some(CompletionOptionsCompletionItem {
                        label_details_support: Some(true),
                    }),
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Handles the LSP initialized notification.
    async fn initialized(&self, _params: InitializedParams) {
        if self.schema.is_empty() {
            warn!("No layouts loaded; completion will never offer suggestions");
        } else {
            info!("Initialized with {} layouts", self.schema.layouts.len());
        }
    }

    /// Handles the LSP shutdown request.
    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    /// Starts tracking a document of a served language.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        if !self.config.read().await.accepts(&item.language_id) {
            debug!("Ignoring {} with language '{}'", item.uri, item.language_id);
            return;
        }

        info!("Opening document: URI={}, version={}", item.uri, item.version);
        let document_id = self.next_document_id();
        let document = Arc::new(LspDocument::new(
            document_id,
            item.uri.clone(),
            item.language_id,
            &item.text,
            item.version,
        ));
        self.documents_by_uri.insert(item.uri, document);
    }

    /// Applies incremental changes, then runs the proactive trigger on the inserted text.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let Some(document) = self.document(&uri) else {
            trace!("Ignoring change to untracked document {}", uri);
            return;
        };

        let mut state = document.state.write().await;
        match state.apply(params.content_changes, version) {
            Ok(edits) => {
                trace!("Applied {} insertions to {} (version {})", edits.len(), uri, version);
                if check_edits(&edits, |line| state.line_text(line)).is_some() {
                    debug!("Typed `data-` in {}, requesting suggestions", uri);
                    self.request_suggestions(&uri);
                }
            }
            Err(e) => warn!("Failed to apply changes to {}: {}", uri, e),
        }
    }

    /// Stops tracking a document.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some((_key, document)) = self.documents_by_uri.remove(&uri) {
            info!("Closed document: {}, id: {}", uri, document.id);
        }
    }

    /// Provides layout suggestions when the cursor follows a `data...` prefix inside a tag.
    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        debug!("Completion request at {}:{:?}", uri, position);

        let Some(document) = self.document(&uri) else {
            debug!("Document not found: {}", uri);
            return Ok(None);
        };

        match self.completion_items(&document, position).await {
            Some(items) if !items.is_empty() => {
                debug!("Returning {} completion items", items.len());
                Ok(Some(CompletionResponse::List(CompletionList {
                    is_incomplete: false,
                    items,
                })))
            }
            _ => Ok(None),
        }
    }

    /// Shows the documentation of the layout named in the hovered tag.
    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(document) = self.document(&uri) else {
            return Ok(None);
        };
        Ok(self.hover_at(&document, position).await)
    }
}
