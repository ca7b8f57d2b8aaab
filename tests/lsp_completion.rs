/// Integration tests for the layout language server
///
/// Tests drive the backend in-process through `tower_lsp::LanguageServer`:
/// - Completion inside and outside open tags, quoted values and served languages
/// - Replacement ranges, snippets and ordering of completion items
/// - Incremental edits, the proactive trigger path and hover documentation

use std::path::Path;
use std::sync::Arc;

use indoc::indoc;
use serde_json::json;
use tower_lsp::{LanguageServer, LspService};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionParams, CompletionResponse, CompletionTextEdit,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    Documentation, HoverContents, HoverParams, InitializeParams, Position, Range,
    TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem,
    TextDocumentPositionParams, Url, VersionedTextDocumentIdentifier,
};

use layout_language_server::lsp::backend::LayoutBackend;
use layout_language_server::lsp::config::ServerConfig;
use layout_language_server::schema;

fn shipped_schema() -> Arc<schema::Schema> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("schema").join("layouts.json");
    let schema = schema::try_load(&path).expect("shipped schema should load");
    Arc::new(schema)
}

fn service() -> (LspService<LayoutBackend>, tower_lsp::ClientSocket) {
    LspService::new(|client| LayoutBackend::new(client, shipped_schema(), ServerConfig::default()))
}

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///tmp/{}", name)).unwrap()
}

async fn open(backend: &LayoutBackend, uri: &Url, language: &str, text: &str) {
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(uri.clone(), language.to_string(), 1, text.to_string()),
        })
        .await;
}

async fn complete(backend: &LayoutBackend, uri: &Url, line: u32, character: u32) -> Option<Vec<CompletionItem>> {
    let response = backend
        .completion(CompletionParams {
            text_document_position: TextDocumentPositionParams::new(
                TextDocumentIdentifier::new(uri.clone()),
                Position::new(line, character),
            ),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        })
        .await
        .expect("completion should not error");

    response.map(|response| match response {
        CompletionResponse::Array(items) => items,
        CompletionResponse::List(list) => list.items,
    })
}

fn insert(line: u32, character: u32, text: &str) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(line, character), Position::new(line, character))),
        range_length: None,
        text: text.to_string(),
    }
}

fn edit_of(item: &CompletionItem) -> (Range, String) {
    match item.text_edit.as_ref() {
        Some(CompletionTextEdit::Edit(edit)) => (edit.range, edit.new_text.clone()),
        other => panic!("expected a plain text edit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_advertises_capabilities() {
    let (service, _socket) = service();
    let backend = service.inner();

    let result = backend
        .initialize(InitializeParams {
            initialization_options: Some(json!({"languages": ["html", "vue"]})),
            ..Default::default()
        })
        .await
        .unwrap();

    let completion = result.capabilities.completion_provider.expect("completion provider");
    assert_eq!(
        completion.trigger_characters,
        Some(vec!["-".to_string(), "\"".to_string(), "'".to_string()])
    );
    assert!(result.capabilities.hover_provider.is_some());
    assert_eq!(result.server_info.map(|info| info.name).as_deref(), Some("layout-language-server"));

    let config = backend.config().await;
    assert!(config.accepts("vue"));
    assert!(!config.accepts("markdown"));
}

#[tokio::test]
async fn test_completion_inside_open_tag() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("page.html");
    let text = indoc! {r#"
        <main>
          <section class="hero" data-l
        </main>
    "#};
    open(backend, &doc, "html", text).await;

    let items = complete(backend, &doc, 1, 30).await.expect("should suggest layouts");

    let labels: Vec<_> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            r#"data-layout="stack""#,
            r#"data-layout="duo""#,
            r#"data-layout="grid""#,
            r#"data-layout="cover""#
        ]
    );

    for item in &items {
        let (range, new_text) = edit_of(item);
        assert_eq!(range, Range::new(Position::new(1, 24), Position::new(1, 30)));
        assert_eq!(item.filter_text.as_deref(), Some(item.label.as_str()));
        assert_eq!(item.preselect, Some(true));
        let name = item.label.trim_start_matches("data-layout=\"").trim_end_matches('"');
        assert_eq!(new_text, format!("data-layout=\"${{1:{}}}\"", name));
    }

    let mut sort_keys: Vec<_> = items.iter().filter_map(|item| item.sort_text.clone()).collect();
    let in_order = sort_keys.clone();
    sort_keys.sort();
    assert_eq!(sort_keys, in_order);
}

#[tokio::test]
async fn test_completion_documents_merged_globals() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("docs.html");
    open(backend, &doc, "html", "<div data").await;

    let items = complete(backend, &doc, 0, 9).await.expect("should suggest layouts");
    let duo = items.iter().find(|item| item.label == r#"data-layout="duo""#).unwrap();

    assert_eq!(
        duo.label_details.as_ref().and_then(|details| details.description.as_deref()),
        Some("Two columns that wrap below a threshold width")
    );
    let detail = duo.detail.as_deref().unwrap();
    assert!(detail.starts_with(r#"Attributes: data-ratio="1:2"; data-reverse | Globals: data-gap="1rem" (default: 0.5rem)"#));

    let Some(Documentation::MarkupContent(docs)) = duo.documentation.as_ref() else {
        panic!("expected markdown documentation");
    };
    assert!(docs.value.starts_with("**Usage:** Exactly two children."));
    assert!(docs.value.contains("**CSS-style properties:**\n- `--duo-threshold=\"40rem\"`"));

    let grid = items.iter().find(|item| item.label == r#"data-layout="grid""#).unwrap();
    let Some(Documentation::MarkupContent(docs)) = grid.documentation.as_ref() else {
        panic!("expected markdown documentation");
    };
    assert!(docs.value.contains("**CSS-style properties:** _none_"));

    let cover = items.iter().find(|item| item.label == r#"data-layout="cover""#).unwrap();
    assert!(cover.detail.as_deref().unwrap().starts_with("Attributes: data-centered marks the principal child"));
}

#[tokio::test]
async fn test_no_completion_outside_trigger_points() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("negative.html");
    let text = indoc! {r#"
        <p>data-l
        <section class="data-l
        <div clas
    "#};
    open(backend, &doc, "html", text).await;

    assert!(complete(backend, &doc, 0, 9).await.is_none(), "outside any tag");
    assert!(complete(backend, &doc, 1, 22).await.is_none(), "inside a quoted value");
    assert!(complete(backend, &doc, 2, 9).await.is_none(), "no data prefix");
}

#[tokio::test]
async fn test_completion_after_just_typed_quote() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("quote.html");
    open(backend, &doc, "html", r#"<section data-layout=""#).await;

    let items = complete(backend, &doc, 0, 22).await.expect("quote exception applies");
    let (range, _) = edit_of(&items[0]);
    assert_eq!(range, Range::new(Position::new(0, 9), Position::new(0, 22)));
}

#[tokio::test]
async fn test_unserved_language_is_inert() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("main.rs");
    open(backend, &doc, "rust", "<section data-l").await;

    assert_eq!(backend.document_count(), 0);
    assert!(complete(backend, &doc, 0, 15).await.is_none());

    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(doc.clone(), 2),
            content_changes: vec![insert(0, 15, "-")],
        })
        .await;
    assert_eq!(backend.document_count(), 0);
}

#[tokio::test]
async fn test_incremental_edits_feed_completion() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("typing.html");
    open(backend, &doc, "html", "<article data").await;

    // The reopen request itself is covered in lsp_protocol.rs
    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(doc.clone(), 2),
            content_changes: vec![insert(0, 13, "-")],
        })
        .await;

    let items = complete(backend, &doc, 0, 14).await.expect("should suggest after data-");
    let (range, _) = edit_of(&items[0]);
    assert_eq!(range, Range::new(Position::new(0, 9), Position::new(0, 14)));

    // Closing the tag ends the suggestion point
    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(doc.clone(), 3),
            content_changes: vec![insert(0, 14, ">")],
        })
        .await;
    assert!(complete(backend, &doc, 0, 15).await.is_none());

    // Stale versions are rejected
    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(doc.clone(), 1),
            content_changes: vec![insert(0, 0, "x")],
        })
        .await;
    assert!(complete(backend, &doc, 0, 14).await.is_some(), "text before the '>' is unchanged");
}

#[tokio::test]
async fn test_hover_shows_layout_documentation() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("hover.md");
    open(backend, &doc, "markdown", "<div data-layout=\"cover\" data-pad=\"1\">text</div>").await;

    let hover = |character: u32| HoverParams {
        text_document_position_params: TextDocumentPositionParams::new(
            TextDocumentIdentifier::new(doc.clone()),
            Position::new(0, character),
        ),
        work_done_progress_params: Default::default(),
    };

    let result = backend.hover(hover(20)).await.unwrap().expect("hover over the layout value");
    let HoverContents::Markup(markup) = result.contents else {
        panic!("expected markdown hover");
    };
    assert!(markup.value.starts_with("### `data-layout=\"cover\"`"));
    assert!(markup.value.contains("`data-align=\"center\" (default: stretch)`"));

    assert!(backend.hover(hover(40)).await.unwrap().is_none(), "text content is not a tag");
}

#[tokio::test]
async fn test_close_forgets_document() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("closing.html");
    open(backend, &doc, "html", "<section data-l").await;
    assert_eq!(backend.document_count(), 1);

    backend
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier::new(doc.clone()),
        })
        .await;

    assert_eq!(backend.document_count(), 0);
    assert!(complete(backend, &doc, 0, 15).await.is_none());
}

#[tokio::test]
async fn test_empty_schema_disables_suggestions() {
    let (service, _socket) = LspService::new(|client| {
        LayoutBackend::new(client, Arc::new(schema::Schema::empty()), ServerConfig::default())
    });
    let backend = service.inner();
    let doc = uri("empty.html");
    open(backend, &doc, "html", "<section data-l").await;

    assert!(complete(backend, &doc, 0, 15).await.is_none());
}

#[tokio::test]
async fn test_ranges_count_utf16_code_units() {
    let (service, _socket) = service();
    let backend = service.inner();
    let doc = uri("emoji.html");
    open(backend, &doc, "html", "<p title=\"😀\" data").await;

    backend
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(doc.clone(), 2),
            content_changes: vec![insert(0, 18, "-"), insert(0, 19, "l")],
        })
        .await;

    // 20 UTF-16 code units, 19 chars
    let items = complete(backend, &doc, 0, 20).await.expect("should suggest after the emoji");
    for item in &items {
        let (range, _) = edit_of(item);
        assert_eq!(range, Range::new(Position::new(0, 14), Position::new(0, 20)));
    }
}
