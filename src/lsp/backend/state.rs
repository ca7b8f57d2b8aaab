//! Backend state management
//!
//! This module defines the LayoutBackend struct, which holds the open
//! documents, the schema loaded at startup, and the server configuration.

use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::lsp::config::ServerConfig;
use crate::lsp::models::LspDocument;
use crate::schema::Schema;

/// The layout language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct LayoutBackend {
    pub(super) client: Client,
    /// Loaded once at startup, never mutated
    pub(super) schema: Arc<Schema>,
    pub(super) config: Arc<RwLock<ServerConfig>>,
    /// Only documents of a served language are tracked
    pub(super) documents_by_uri: Arc<DashMap<Url, Arc<LspDocument>>>,
    pub(super) serial_document_id: Arc<AtomicU32>,
}

impl std::fmt::Debug for LayoutBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutBackend")
            .field("layouts", &self.schema.layouts.len())
            .field("documents_count", &self.documents_by_uri.len())
            .finish()
    }
}
