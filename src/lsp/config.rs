//! Server configuration
//!
//! Sources, highest precedence first:
//! 1. Command-line flags (applied by `main`)
//! 2. Environment variables `LAYOUT_LS_SCHEMA` and `LAYOUT_LS_LANGUAGES`
//! 3. Built-in defaults
//!
//! The client may additionally replace the language set through
//! `initializationOptions.languages`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

pub const SCHEMA_ENV_VAR: &str = "LAYOUT_LS_SCHEMA";
pub const LANGUAGES_ENV_VAR: &str = "LAYOUT_LS_LANGUAGES";

/// Schema file looked up next to the installed executable.
pub const DEFAULT_SCHEMA_FILE: &str = "layouts.json";

pub const DEFAULT_LANGUAGES: &[&str] = &["html", "markdown"];
pub const DEFAULT_TRIGGER_CHARACTERS: &[&str] = &["-", "\"", "'"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// LSP language ids served; other documents are ignored
    pub languages: BTreeSet<String>,
    /// Characters that make the client request completion
    pub trigger_characters: Vec<String>,
    pub schema_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            trigger_characters: DEFAULT_TRIGGER_CHARACTERS.iter().map(|s| s.to_string()).collect(),
            schema_path: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(SCHEMA_ENV_VAR) {
            if !path.trim().is_empty() {
                config.schema_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(languages) = std::env::var(LANGUAGES_ENV_VAR) {
            config = config.with_languages(parse_list(&languages));
        }

        config
    }

    /// Replace the language set. An empty set is ignored.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let languages: BTreeSet<String> = languages
            .into_iter()
            .map(|language| language.into().trim().to_lowercase())
            .filter(|language| !language.is_empty())
            .collect();
        if languages.is_empty() {
            warn!("Ignoring empty language list, keeping {:?}", self.languages);
        } else {
            self.languages = languages;
        }
        self
    }

    /// Replace the trigger characters. Entries that are not a single
    /// character are dropped.
    pub fn with_trigger_characters<I, S>(mut self, characters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let characters: Vec<String> = characters
            .into_iter()
            .map(Into::into)
            .filter(|c| {
                let single = c.chars().count() == 1;
                if !single {
                    warn!("Ignoring trigger character {:?}: not a single character", c);
                }
                single
            })
            .collect();
        if !characters.is_empty() {
            self.trigger_characters = characters;
        }
        self
    }

    pub fn with_schema_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.schema_path = path;
        }
        self
    }

    /// Whether documents with this LSP language id are served.
    pub fn accepts(&self, language_id: &str) -> bool {
        self.languages.contains(&language_id.to_lowercase())
    }

    /// The configured schema path, or `layouts.json` beside the executable.
    pub fn resolve_schema_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.schema_path {
            return Some(path.clone());
        }
        let exe = std::env::current_exe().ok()?;
        Some(exe.parent()?.join(DEFAULT_SCHEMA_FILE))
    }

    /// Apply client `initializationOptions`, if they parse.
    pub fn apply_initialization_options(self, options: Option<serde_json::Value>) -> Self {
        let Some(options) = options else {
            return self;
        };
        match serde_json::from_value::<InitializationOptions>(options) {
            Ok(InitializationOptions { languages: Some(languages) }) => self.with_languages(languages),
            Ok(_) => self,
            Err(e) => {
                warn!("Ignoring malformed initializationOptions: {}", e);
                self
            }
        }
    }
}

/// Client-supplied `initializationOptions`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    pub languages: Option<Vec<String>>,
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
