//! Extension side table.
//!
//! Extensions are fields declared outside a message type's own schema and
//! attached to an instance by global field number. The table stores their
//! values; the matching [`FieldDescriptor`](crate::FieldDescriptor)s live in
//! the pool, keyed by extendee and number.

use crate::value::FieldValue;
use std::collections::BTreeMap;

/// Extension values of one message instance, ordered by field number.
#[derive(Debug, Default)]
pub struct ExtensionSet {
    entries: BTreeMap<u32, FieldValue>,
}

impl ExtensionSet {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of set extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no extension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the extension with this number is set.
    #[must_use]
    pub fn contains(&self, number: u32) -> bool {
        self.entries.contains_key(&number)
    }

    /// The value of a set extension.
    #[must_use]
    pub fn get(&self, number: u32) -> Option<&FieldValue> {
        self.entries.get(&number)
    }

    /// Mutable access to a set extension.
    pub fn get_mut(&mut self, number: u32) -> Option<&mut FieldValue> {
        self.entries.get_mut(&number)
    }

    /// Stores a value without checking it against a descriptor.
    /// Returns the previous value for that number.
    pub fn insert(&mut self, number: u32, value: FieldValue) -> Option<FieldValue> {
        self.entries.insert(number, value)
    }

    /// Unsets an extension, returning its value.
    pub fn remove(&mut self, number: u32) -> Option<FieldValue> {
        self.entries.remove(&number)
    }

    /// Set extension numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Set extensions in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &FieldValue)> {
        self.entries.iter().map(|(&n, v)| (n, v))
    }
}
