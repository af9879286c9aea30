//! Deep structural equality for messages.
//!
//! Two messages are equal when they share a descriptor and every field holds
//! the same value. Absence is compared the way a reader of the message would
//! observe it: an implicit-presence field that is absent equals one holding
//! its zero value, and an absent list or map equals an empty one.

use crate::descriptor::FieldDescriptor;
use crate::extension::ExtensionSet;
use crate::message::Message;
use crate::value::FieldValue;
use std::collections::BTreeSet;

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        if self.descriptor() != other.descriptor() {
            return false;
        }
        let fields_equal = self.descriptor().fields().iter().all(|field| {
            slots_equal(
                Some(field),
                self.slot(field.index()),
                other.slot(field.index()),
            )
        });
        fields_equal && extensions_equal(self.extensions(), other.extensions())
    }
}

fn extensions_equal(a: &ExtensionSet, b: &ExtensionSet) -> bool {
    let numbers: BTreeSet<u32> = a.numbers().chain(b.numbers()).collect();
    numbers
        .into_iter()
        .all(|n| slots_equal(None, a.get(n), b.get(n)))
}

fn slots_equal(
    field: Option<&FieldDescriptor>,
    a: Option<&FieldValue>,
    b: Option<&FieldValue>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        (Some(present), None) | (None, Some(present)) => reads_as_absent(field, present),
    }
}

fn reads_as_absent(field: Option<&FieldDescriptor>, value: &FieldValue) -> bool {
    match value {
        FieldValue::List(_) | FieldValue::Map(_) => value.is_empty_collection(),
        FieldValue::Singular(v) => {
            field.is_some_and(FieldDescriptor::has_implicit_presence) && v.is_zero()
        }
        FieldValue::Oneof(_) => false,
    }
}
