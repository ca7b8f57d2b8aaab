//! Global attribute overrides
//!
//! Root-level global attributes apply to every layout. A layout may override
//! individual fields of a global attribute through
//! `globalAttributeOverrides`; only the fields present in the override
//! replace those of the base descriptor.

use super::{AttributeDescriptor, AttributeEntry, LayoutEntry, Schema};

/// Global attributes in effect for one layout, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveGlobalSet {
    entries: Vec<AttributeEntry>,
}

impl EffectiveGlobalSet {
    pub fn entries(&self) -> &[AttributeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.entries
            .iter()
            .filter_map(AttributeEntry::as_descriptor)
            .find(|descriptor| descriptor.name == name)
    }

    /// Layer `entry` over the set: field-level merge when the name is
    /// already present, append otherwise.
    fn apply(&mut self, entry: &AttributeEntry) {
        let AttributeEntry::Descriptor(patch) = entry else {
            self.entries.push(entry.clone());
            return;
        };

        let existing = self
            .entries
            .iter_mut()
            .find(|current| current.name() == Some(patch.name.as_str()));

        match existing {
            Some(AttributeEntry::Descriptor(base)) => *base = merge_descriptor(base, patch),
            _ => self.entries.push(entry.clone()),
        }
    }
}

/// Merge `patch` over `base`, field by field.
pub fn merge_descriptor(base: &AttributeDescriptor, patch: &AttributeDescriptor) -> AttributeDescriptor {
    AttributeDescriptor {
        name: base.name.clone(),
        value: patch.value.clone().or_else(|| base.value.clone()),
        description: patch.description.clone().or_else(|| base.description.clone()),
        default_value: patch.default_value.clone().or_else(|| base.default_value.clone()),
    }
}

/// Compute the global attributes in effect for `layout`.
///
/// Root descriptors sharing a name collapse into their first position, with
/// later ones layered over earlier ones, the same way overrides are.
pub fn effective_globals(schema: &Schema, layout: &LayoutEntry) -> EffectiveGlobalSet {
    let mut set = EffectiveGlobalSet::default();
    for entry in schema.global_attributes.iter().chain(layout.overrides()) {
        set.apply(entry);
    }
    set
}
