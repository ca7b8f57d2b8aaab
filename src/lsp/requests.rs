//! Custom server-to-client requests

use tower_lsp::lsp_types::request::Request;

/// Ask the client to open its suggestion widget at the cursor.
///
/// Clients map this to their own command (for VS Code,
/// `editor.action.triggerSuggest`). The response is ignored.
#[derive(Debug)]
pub enum TriggerSuggest {}

impl Request for TriggerSuggest {
    type Params = ();
    type Result = serde_json::Value;
    const METHOD: &'static str = "layout/triggerSuggest";
}
