//! In-process LSP client for protocol-level tests
//!
//! Runs `tower_lsp::Server` over in-memory pipes and speaks JSON-RPC with
//! `Content-Length` framing, so server-to-client requests can be observed
//! and answered the way an editor would.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{duplex, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_lsp::{LspService, Server};

use layout_language_server::lsp::backend::LayoutBackend;
use layout_language_server::lsp::config::ServerConfig;
use layout_language_server::schema::{self, Schema};

pub fn shipped_schema() -> Arc<Schema> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("schema").join("layouts.json");
    Arc::new(schema::try_load(&path).expect("shipped schema should load"))
}

pub struct LspTestClient {
    writer: DuplexStream,
    incoming: mpsc::UnboundedReceiver<Value>,
    pending: VecDeque<Value>,
    next_id: i64,
    server: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl LspTestClient {
    pub fn start(schema: Arc<Schema>, config: ServerConfig) -> Self {
        let (writer, server_stdin) = duplex(64 * 1024);
        let (server_stdout, client_stdin) = duplex(64 * 1024);

        let (service, socket) = LspService::new(move |client| LayoutBackend::new(client, schema, config));
        let server = tokio::spawn(async move {
            Server::new(server_stdin, server_stdout, socket).serve(service).await;
        });

        let (sender, incoming) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let mut stream = BufReader::new(client_stdin);
            while let Some(message) = read_message(&mut stream).await {
                if sender.send(message).is_err() {
                    break;
                }
            }
        });

        Self {
            writer,
            incoming,
            pending: VecDeque::new(),
            next_id: 0,
            server,
            reader,
        }
    }

    async fn write(&mut self, message: Value) {
        let body = message.to_string();
        let frame = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer
            .write_all(frame.as_bytes())
            .await
            .expect("server input should be open");
        self.writer.flush().await.expect("server input should flush");
    }

    /// Send a request and wait for its response. Other messages are queued.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.write(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;

        loop {
            let message = self.incoming.recv().await.expect("server closed before responding");
            if message.get("method").is_none() && message["id"] == json!(id) {
                return message;
            }
            self.pending.push_back(message);
        }
    }

    pub async fn notify(&mut self, method: &str, params: Value) {
        self.write(json!({"jsonrpc": "2.0", "method": method, "params": params}))
            .await;
    }

    /// `initialize` followed by `initialized`.
    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(
                "initialize",
                json!({"processId": null, "rootUri": null, "capabilities": {}}),
            )
            .await;
        self.notify("initialized", json!({})).await;
        response
    }

    /// Next server-to-client request for `method`, waiting at most `wait`.
    pub async fn next_server_request(&mut self, method: &str, wait: Duration) -> Option<Value> {
        let is_wanted = |message: &Value| message["method"] == method && message.get("id").is_some();

        if let Some(index) = self.pending.iter().position(is_wanted) {
            return self.pending.remove(index);
        }

        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let message = tokio::time::timeout_at(deadline, self.incoming.recv()).await.ok()??;
            if is_wanted(&message) {
                return Some(message);
            }
            self.pending.push_back(message);
        }
    }

    /// Answer a server-to-client request with a JSON-RPC error.
    pub async fn respond_error(&mut self, request: &Value, code: i64, message: &str) {
        let id = request["id"].clone();
        self.write(json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}}))
            .await;
    }
}

impl Drop for LspTestClient {
    fn drop(&mut self) {
        self.server.abort();
        self.reader.abort();
    }
}

async fn read_message(stream: &mut BufReader<DuplexStream>) -> Option<Value> {
    let mut content_length = None;
    loop {
        let mut header = String::new();
        if stream.read_line(&mut header).await.ok()? == 0 {
            return None;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some(value) = header.strip_prefix("Content-Length:") {
            content_length = value.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0; content_length?];
    stream.read_exact(&mut body).await.ok()?;
    serde_json::from_slice(&body).ok()
}
