//! Layout schema model
//!
//! The schema describes every layout an author may assign with
//! `data-layout="..."`, the attributes specific to each layout, and the
//! global attributes shared by all of them. It is decoded once at startup
//! from loosely-shaped JSON into the strict types below; everything
//! downstream works on these types only.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::{deserialize_attribute_list, deserialize_lenient_string};

pub mod loader;
pub mod merge;

pub use loader::{load, try_load, SchemaError};
pub use merge::{effective_globals, merge_descriptor, EffectiveGlobalSet};

/// One concrete attribute an author may add to a tag once a layout is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    pub name: String,

    /// Example value, rendered as `name="value"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            description: None,
            default_value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// An attribute-like schema value.
///
/// Anything that is not a well-formed descriptor object is kept as its raw
/// string form and displayed verbatim, so one bad entry never hides its
/// siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeEntry {
    Descriptor(AttributeDescriptor),
    Raw(String),
}

impl AttributeEntry {
    /// Decodes a single JSON value, never failing.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => AttributeEntry::Raw(text),
            serde_json::Value::Object(_) => {
                let raw = value.to_string();
                match serde_json::from_value::<AttributeDescriptor>(value) {
                    Ok(descriptor) if !descriptor.name.is_empty() => {
                        AttributeEntry::Descriptor(descriptor)
                    }
                    _ => AttributeEntry::Raw(raw),
                }
            }
            other => AttributeEntry::Raw(other.to_string()),
        }
    }

    /// Name used for keyed merging; raw entries have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            AttributeEntry::Descriptor(descriptor) => Some(&descriptor.name),
            AttributeEntry::Raw(_) => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&AttributeDescriptor> {
        match self {
            AttributeEntry::Descriptor(descriptor) => Some(descriptor),
            AttributeEntry::Raw(_) => None,
        }
    }
}

impl From<AttributeDescriptor> for AttributeEntry {
    fn from(descriptor: AttributeDescriptor) -> Self {
        AttributeEntry::Descriptor(descriptor)
    }
}

impl<'de> Deserialize<'de> for AttributeEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(AttributeEntry::from_value(value))
    }
}

/// The `attributes` or `properties` of a layout.
///
/// Older schema files sometimes carry a free-text string instead of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeList {
    Items(Vec<AttributeEntry>),
    Text(String),
}

impl AttributeList {
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeList::Items(items) => items.is_empty(),
            AttributeList::Text(text) => text.trim().is_empty(),
        }
    }
}

impl Default for AttributeList {
    fn default() -> Self {
        AttributeList::Items(Vec::new())
    }
}

impl From<Vec<AttributeEntry>> for AttributeList {
    fn from(items: Vec<AttributeEntry>) -> Self {
        AttributeList::Items(items)
    }
}

/// A named layout offered as `data-layout="<name>"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub usage: Option<String>,

    #[serde(default, deserialize_with = "deserialize_attribute_list")]
    pub attributes: AttributeList,

    /// CSS custom-property hints
    #[serde(default, deserialize_with = "deserialize_attribute_list")]
    pub properties: AttributeList,

    #[serde(default)]
    pub global_attribute_overrides: Option<Vec<AttributeEntry>>,
}

impl LayoutEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            usage: None,
            attributes: AttributeList::default(),
            properties: AttributeList::default(),
            global_attribute_overrides: None,
        }
    }

    /// Display name, falling back to the identifier.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.name,
        }
    }

    pub fn overrides(&self) -> &[AttributeEntry] {
        self.global_attribute_overrides.as_deref().unwrap_or(&[])
    }
}

/// The loaded schema. Immutable for the lifetime of the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub global_attributes: Vec<AttributeEntry>,
    pub layouts: Vec<LayoutEntry>,
}

impl Schema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn layout(&self, name: &str) -> Option<&LayoutEntry> {
        self.layouts.iter().find(|layout| layout.name == name)
    }
}
