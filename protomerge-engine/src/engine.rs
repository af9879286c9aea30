use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use protomerge_model::{
    FieldDescriptor, FieldValue, MapKey, MapKeyType, Message, MessageDescriptor, OneofCase,
    OneofValue, Value, ValueKind,
};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Clones and merges messages by walking their descriptors.
///
/// The engine holds no state besides its configuration; one instance can
/// serve any number of calls, from any thread.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: EngineConfig,
}

impl MergeEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Produces a deep copy of `src` that shares no storage with it.
    pub fn clone_message(&self, src: &Message) -> EngineResult<Message> {
        debug!(message = src.type_name(), "cloning message");
        self.clone_at(src, 0)
            .inspect_err(|err| warn!(%err, "clone failed"))
    }

    /// Clones an optional message: `None` in, `None` out.
    pub fn clone_optional(&self, src: Option<&Message>) -> EngineResult<Option<Message>> {
        src.map(|m| self.clone_message(m)).transpose()
    }

    /// Folds `src` into `dst` in place.
    ///
    /// Both messages must share the same descriptor. A type mismatch is
    /// reported before anything in `dst` changes.
    pub fn merge(&self, dst: &mut Message, src: &Message) -> EngineResult<()> {
        debug!(message = src.type_name(), "merging message");
        self.merge_at(dst, src, 0)
            .inspect_err(|err| warn!(%err, "merge failed"))
    }

    /// Returns a new message holding `src` merged into a copy of `dst`.
    pub fn merged(&self, dst: &Message, src: &Message) -> EngineResult<Message> {
        let mut result = self.clone_message(dst)?;
        self.merge(&mut result, src)?;
        Ok(result)
    }

    /// Checks the configured depth limit before visiting a message.
    pub(crate) fn enter(&self, depth: usize) -> EngineResult<()> {
        match self.config.max_depth {
            Some(limit) if depth > limit => Err(EngineError::DepthLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    pub(crate) fn trace_field(&self, owner: &MessageDescriptor, field: &FieldDescriptor, op: &str) {
        if self.config.trace_fields {
            trace!(
                message = owner.full_name(),
                field = field.name(),
                number = field.number(),
                op,
                "visiting field"
            );
        }
    }

    /// Copies one element. Scalars and bytes are copied by value, nested
    /// messages are cloned one level deeper.
    pub(crate) fn copy_element(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        kind: &ValueKind,
        value: &Value,
        depth: usize,
    ) -> EngineResult<Value> {
        if !owner.accepts_element(kind, value) {
            return Err(shape_mismatch(owner, field));
        }
        match value {
            Value::Message(m) => Ok(Value::Message(Box::new(self.clone_at(m, depth + 1)?))),
            other => other
                .copy_scalar()
                .ok_or_else(|| shape_mismatch(owner, field)),
        }
    }

    /// Copies a whole list into a new vector of the same length.
    pub(crate) fn copy_list(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        items: &[Value],
        depth: usize,
    ) -> EngineResult<Vec<Value>> {
        let kind = element_kind(owner, field)?;
        let mut copies = Vec::with_capacity(items.len());
        for item in items {
            copies.push(self.copy_element(owner, field, &kind, item, depth)?);
        }
        Ok(copies)
    }

    pub(crate) fn copy_map(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        key_type: MapKeyType,
        value_kind: &ValueKind,
        entries: &BTreeMap<MapKey, Value>,
        depth: usize,
    ) -> EngineResult<BTreeMap<MapKey, Value>> {
        let mut copies = BTreeMap::new();
        for (key, value) in entries {
            if key.key_type() != key_type {
                return Err(shape_mismatch(owner, field));
            }
            copies.insert(
                key.clone(),
                self.copy_element(owner, field, value_kind, value, depth)?,
            );
        }
        Ok(copies)
    }

    pub(crate) fn copy_oneof(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        cases: &[OneofCase],
        selected: &OneofValue,
        depth: usize,
    ) -> EngineResult<OneofValue> {
        let case = cases
            .iter()
            .find(|c| c.name == selected.case)
            .ok_or_else(|| shape_mismatch(owner, field))?;
        Ok(OneofValue {
            case: selected.case.clone(),
            value: self.copy_element(owner, field, &case.kind, &selected.value, depth)?,
        })
    }
}

/// The element kind of a singular or repeated field.
pub(crate) fn element_kind(
    owner: &MessageDescriptor,
    field: &FieldDescriptor,
) -> EngineResult<ValueKind> {
    field
        .kind()
        .element()
        .ok_or_else(|| shape_mismatch(owner, field))
}

/// The storage slot of a declared field.
pub(crate) fn slot_of<'a>(
    message: &'a mut Message,
    owner: &MessageDescriptor,
    field: &FieldDescriptor,
) -> EngineResult<&'a mut Option<FieldValue>> {
    message
        .slot_mut(field.index())
        .ok_or_else(|| shape_mismatch(owner, field))
}

pub(crate) fn shape_mismatch(owner: &MessageDescriptor, field: &FieldDescriptor) -> EngineError {
    EngineError::ShapeMismatch {
        message: owner.full_name().to_string(),
        field: field.name().to_string(),
        expected: format!("{:?}", field.kind()),
    }
}
