//! Serde helpers for lenient schema decoding
//!
//! Schema files are hand-edited and have drifted over time. These helpers
//! accept the shapes seen in the wild instead of rejecting a whole layout
//! because one field has an unexpected type.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::schema::{AttributeEntry, AttributeList};

/// Deserialize an attribute list from either a sequence or a plain string.
///
/// Any other shape (number, object, null) decodes to an empty list.
pub fn deserialize_attribute_list<'de, D>(deserializer: D) -> Result<AttributeList, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => {
            AttributeList::Items(items.into_iter().map(AttributeEntry::from_value).collect())
        }
        Value::String(text) => AttributeList::Text(text),
        _ => AttributeList::default(),
    })
}

/// Deserialize an optional free-text field, keeping only string values.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        _ => None,
    })
}
