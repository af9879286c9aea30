//! Deep clone.
//!
//! A clone allocates a fresh message of the source's type and copies every
//! present slot by kind. Absent slots stay absent, present-but-empty lists and
//! maps stay present, and the extension table is rebuilt by merging the
//! source's table into an empty one.

use crate::engine::{MergeEngine, element_kind, shape_mismatch, slot_of};
use crate::error::EngineResult;
use protomerge_model::{FieldDescriptor, FieldValue, Kind, Message, MessageDescriptor};

impl MergeEngine {
    pub(crate) fn clone_at(&self, src: &Message, depth: usize) -> EngineResult<Message> {
        self.enter(depth)?;
        let descriptor = src.descriptor();
        let mut out = descriptor.new_message();

        for field in descriptor.fields() {
            let Some(value) = src.slot(field.index()) else {
                continue;
            };
            self.trace_field(descriptor, field, "clone");
            let copy = self.clone_field(descriptor, field, value, depth)?;
            *slot_of(&mut out, descriptor, field)? = Some(copy);
        }

        self.merge_extensions(&mut out, src, depth)?;
        Ok(out)
    }

    fn clone_field(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        value: &FieldValue,
        depth: usize,
    ) -> EngineResult<FieldValue> {
        match (field.kind(), value) {
            (Kind::Scalar(_) | Kind::Bytes | Kind::Message(_), FieldValue::Singular(v)) => {
                let kind = element_kind(owner, field)?;
                Ok(FieldValue::Singular(
                    self.copy_element(owner, field, &kind, v, depth)?,
                ))
            }
            (
                Kind::RepeatedScalar(_) | Kind::RepeatedBytes | Kind::RepeatedMessage(_),
                FieldValue::List(items),
            ) => Ok(FieldValue::List(self.copy_list(owner, field, items, depth)?)),
            (Kind::Map { key, value: kind }, FieldValue::Map(entries)) => Ok(FieldValue::Map(
                self.copy_map(owner, field, *key, kind, entries, depth)?,
            )),
            (Kind::Oneof(cases), FieldValue::Oneof(selected)) => Ok(FieldValue::Oneof(
                self.copy_oneof(owner, field, cases, selected, depth)?,
            )),
            _ => Err(shape_mismatch(owner, field)),
        }
    }
}
