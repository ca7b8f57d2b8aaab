pub mod completion;
pub mod logging;
pub mod lsp;
pub mod schema;
pub mod serde_helpers;
