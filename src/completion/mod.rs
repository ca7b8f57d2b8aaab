//! Layout attribute completion
//!
//! This module provides:
//! - Trigger detection from raw text (prefix, open tag and quote heuristics)
//! - Suggestion construction with merged global attribute documentation
//! - Layout documentation for hover
//! - The proactive trigger that asks the client to reopen suggestions after `data-`
//!
//! Everything here is synchronous and free of I/O; the LSP backend feeds it
//! text and the schema loaded at startup.

pub mod context;
pub mod hover;
pub mod provider;
pub mod render;
pub mod trigger;

pub use context::{detect_trigger, ReplaceSpan, TriggerContext};
pub use hover::{layout_documentation, layout_documentation_at};
pub use provider::{canonical_label, provide_suggestions, snippet, sort_key, Suggestion};
pub use trigger::{check_edits, EditEvent, ReopenCommand};
