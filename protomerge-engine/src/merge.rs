//! In-place merge.
//!
//! Rules by field kind:
//! - scalars and bytes: a present source value replaces the destination;
//!   under implicit presence a zero source value is treated as unset
//! - nested messages: merged recursively, or cloned when the destination is absent
//! - repeated fields: source elements are appended after the destination's
//! - maps: upsert per key, replacing the whole value on collision
//! - oneofs: a set source replaces the destination's selection outright
//!
//! Every source value is copied in full before the destination slot is
//! written, so a failing field never leaves a half-merged slot behind.

use crate::engine::{MergeEngine, element_kind, shape_mismatch, slot_of};
use crate::error::{EngineError, EngineResult};
use protomerge_model::{FieldDescriptor, FieldValue, Kind, Message, MessageDescriptor, Value};

impl MergeEngine {
    pub(crate) fn merge_at(&self, dst: &mut Message, src: &Message, depth: usize) -> EngineResult<()> {
        if dst.descriptor() != src.descriptor() {
            return Err(EngineError::TypeMismatch {
                expected: dst.type_name().to_string(),
                found: src.type_name().to_string(),
            });
        }
        self.enter(depth)?;
        let descriptor = src.descriptor();

        for field in descriptor.fields() {
            let Some(value) = src.slot(field.index()) else {
                continue;
            };
            self.trace_field(descriptor, field, "merge");
            let slot = slot_of(dst, descriptor, field)?;
            self.merge_field(descriptor, field, slot, value, depth)?;
        }

        self.merge_extensions(dst, src, depth)
    }

    /// Merges one present source value into a destination slot.
    pub(crate) fn merge_field(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        slot: &mut Option<FieldValue>,
        src: &FieldValue,
        depth: usize,
    ) -> EngineResult<()> {
        match (field.kind(), src) {
            (Kind::Scalar(_) | Kind::Bytes, FieldValue::Singular(v)) => {
                let kind = element_kind(owner, field)?;
                if !owner.accepts_element(&kind, v) {
                    return Err(shape_mismatch(owner, field));
                }
                if field.has_implicit_presence() && v.is_zero() {
                    return Ok(());
                }
                let copy = self.copy_element(owner, field, &kind, v, depth)?;
                *slot = Some(FieldValue::Singular(copy));
                Ok(())
            }
            (Kind::Message(_), FieldValue::Singular(v)) => {
                let kind = element_kind(owner, field)?;
                if !owner.accepts_element(&kind, v) {
                    return Err(shape_mismatch(owner, field));
                }
                match slot {
                    Some(FieldValue::Singular(Value::Message(existing))) => {
                        let Value::Message(incoming) = v else {
                            return Err(shape_mismatch(owner, field));
                        };
                        self.merge_at(existing, incoming, depth + 1)
                    }
                    None => {
                        let copy = self.copy_element(owner, field, &kind, v, depth)?;
                        *slot = Some(FieldValue::Singular(copy));
                        Ok(())
                    }
                    Some(_) => Err(shape_mismatch(owner, field)),
                }
            }
            (
                Kind::RepeatedScalar(_) | Kind::RepeatedBytes | Kind::RepeatedMessage(_),
                FieldValue::List(items),
            ) => {
                let copies = self.copy_list(owner, field, items, depth)?;
                match slot {
                    Some(FieldValue::List(existing)) => {
                        existing.extend(copies);
                        Ok(())
                    }
                    None => {
                        *slot = Some(FieldValue::List(copies));
                        Ok(())
                    }
                    Some(_) => Err(shape_mismatch(owner, field)),
                }
            }
            (Kind::Map { key, value: kind }, FieldValue::Map(entries)) => {
                let copies = self.copy_map(owner, field, *key, kind, entries, depth)?;
                match slot {
                    Some(FieldValue::Map(existing)) => {
                        existing.extend(copies);
                        Ok(())
                    }
                    None => {
                        *slot = Some(FieldValue::Map(copies));
                        Ok(())
                    }
                    Some(_) => Err(shape_mismatch(owner, field)),
                }
            }
            (Kind::Oneof(cases), FieldValue::Oneof(selected)) => {
                let copy = self.copy_oneof(owner, field, cases, selected, depth)?;
                *slot = Some(FieldValue::Oneof(copy));
                Ok(())
            }
            _ => Err(shape_mismatch(owner, field)),
        }
    }
}
