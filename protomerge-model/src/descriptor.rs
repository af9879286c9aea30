//! Compiled descriptors and the pool that owns them.
//!
//! A [`DescriptorPool`] is built once from schema definitions and is immutable
//! afterwards. [`MessageDescriptor`] is a cheap handle into the pool, so
//! messages can carry their type around and recursive message types need no
//! special treatment.

use crate::error::{ModelError, Result};
use crate::message::Message;
use crate::schema::{
    ExtensionDef, FieldDef, Kind, MessageDef, PresenceRule, SchemaDef, Syntax, ValueKind,
};
use crate::value::{FieldValue, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// A field of a compiled message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    number: u32,
    index: usize,
    kind: Kind,
    presence: PresenceRule,
}

impl FieldDescriptor {
    /// The field's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field number. For a oneof this is its lowest alternative number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Position of the field's storage slot in its message. For extensions
    /// this is the registration order within the extendee.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The declared shape of the field.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Presence rule after applying the message syntax default.
    #[must_use]
    pub fn presence(&self) -> PresenceRule {
        self.presence
    }

    /// True when a zero value is indistinguishable from "not set".
    #[must_use]
    pub fn has_implicit_presence(&self) -> bool {
        self.presence == PresenceRule::Implicit
    }
}

#[derive(Debug)]
struct MessageType {
    name: String,
    syntax: Syntax,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    extension_ranges: Vec<RangeInclusive<u32>>,
    extensions: BTreeMap<u32, FieldDescriptor>,
}

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageType>,
    by_name: HashMap<String, usize>,
}

/// An immutable registry of message types and their extensions.
///
/// Cloning is cheap and the pool is safe to share between threads.
#[derive(Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

impl DescriptorPool {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    /// Compiles a schema document.
    pub fn from_schema(schema: SchemaDef) -> Result<Self> {
        PoolBuilder::default().add_schema(schema).build()
    }

    /// Parses and compiles a JSON schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: SchemaDef = serde_json::from_str(json)?;
        Self::from_schema(schema)
    }

    /// Returns the descriptor of a registered message type.
    pub fn describe(&self, name: &str) -> Result<MessageDescriptor> {
        self.get_message(name)
            .ok_or_else(|| ModelError::UnknownMessage(name.to_string()))
    }

    /// Looks up a message type by full name.
    #[must_use]
    pub fn get_message(&self, name: &str) -> Option<MessageDescriptor> {
        self.inner
            .by_name
            .get(name)
            .map(|&index| MessageDescriptor {
                pool: self.clone(),
                index,
            })
    }

    /// Allocates an empty message of a registered type.
    pub fn new_message(&self, name: &str) -> Result<Message> {
        Ok(Message::new(self.describe(name)?))
    }

    /// Iterates over every registered message type in registration order.
    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(|index| MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }

    /// True if both handles refer to the same compiled pool.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.messages.iter().map(|m| &m.name))
            .finish()
    }
}

/// Handle to one message type inside a [`DescriptorPool`].
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn ty(&self) -> &MessageType {
        &self.pool.inner.messages[self.index]
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.ty().name
    }

    /// Syntax the type was declared with.
    #[must_use]
    pub fn syntax(&self) -> Syntax {
        self.ty().syntax
    }

    /// The pool this type belongs to.
    #[must_use]
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// The declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.ty().fields
    }

    /// The field at a slot index.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.ty().fields.get(index)
    }

    /// Looks up a declared field by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        let ty = self.ty();
        ty.by_name.get(name).map(|&i| &ty.fields[i])
    }

    /// Looks up a declared field by number. A oneof answers to the number of
    /// every one of its alternatives.
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.ty().fields.iter().find(|f| match &f.kind {
            Kind::Oneof(cases) => cases.iter().any(|c| c.number == number),
            _ => f.number == number,
        })
    }

    /// True if at least one extension range is declared.
    #[must_use]
    pub fn is_extendable(&self) -> bool {
        !self.ty().extension_ranges.is_empty()
    }

    /// The registered extension with this number, if any.
    #[must_use]
    pub fn extension(&self, number: u32) -> Option<&FieldDescriptor> {
        self.ty().extensions.get(&number)
    }

    /// Every extension registered for this type, ordered by number.
    pub fn extensions(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.ty().extensions.values()
    }

    /// Resolves a message type name in the same pool.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<MessageDescriptor> {
        self.pool.get_message(type_name)
    }

    /// Allocates an empty message of this type.
    #[must_use]
    pub fn new_message(&self) -> Message {
        Message::new(self.clone())
    }

    /// True if `value` has the shape `kind` asks for. Nested messages must be
    /// of the referenced type from this pool.
    #[must_use]
    pub fn accepts_element(&self, kind: &ValueKind, value: &Value) -> bool {
        match kind {
            ValueKind::Scalar(scalar) => value.scalar_type() == Some(*scalar),
            ValueKind::Bytes => matches!(value, Value::Bytes(_)),
            ValueKind::Message(name) => match value {
                Value::Message(m) => self
                    .resolve(name)
                    .is_some_and(|expected| &expected == m.descriptor()),
                _ => false,
            },
        }
    }

    /// True if `value` may be stored in a slot described by `field`.
    ///
    /// Only the top level of each element is inspected; nested messages were
    /// checked when their own fields were set.
    #[must_use]
    pub fn accepts(&self, field: &FieldDescriptor, value: &FieldValue) -> bool {
        match (field.kind(), value) {
            (Kind::Scalar(_) | Kind::Bytes | Kind::Message(_), FieldValue::Singular(v)) => field
                .kind()
                .element()
                .is_some_and(|kind| self.accepts_element(&kind, v)),
            (
                Kind::RepeatedScalar(_) | Kind::RepeatedBytes | Kind::RepeatedMessage(_),
                FieldValue::List(items),
            ) => field
                .kind()
                .element()
                .is_some_and(|kind| items.iter().all(|v| self.accepts_element(&kind, v))),
            (Kind::Map { key, value: kind }, FieldValue::Map(entries)) => entries
                .iter()
                .all(|(k, v)| k.key_type() == *key && self.accepts_element(kind, v)),
            (Kind::Oneof(cases), FieldValue::Oneof(selected)) => cases
                .iter()
                .find(|c| c.name == selected.case)
                .is_some_and(|c| self.accepts_element(&c.kind, &selected.value)),
            _ => false,
        }
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.pool.ptr_eq(&other.pool)
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

/// Collects schema definitions and compiles them into a [`DescriptorPool`].
#[derive(Debug, Default)]
pub struct PoolBuilder {
    messages: Vec<MessageDef>,
    extensions: Vec<ExtensionDef>,
}

impl PoolBuilder {
    /// Queues a message type.
    #[must_use]
    pub fn add_message(mut self, def: MessageDef) -> Self {
        self.messages.push(def);
        self
    }

    /// Queues an extension of a message type.
    #[must_use]
    pub fn add_extension(mut self, def: ExtensionDef) -> Self {
        self.extensions.push(def);
        self
    }

    /// Queues every message and extension of a schema document.
    #[must_use]
    pub fn add_schema(mut self, schema: SchemaDef) -> Self {
        self.messages.extend(schema.messages);
        self.extensions.extend(schema.extensions);
        self
    }

    /// Validates every definition and freezes the pool.
    pub fn build(self) -> Result<DescriptorPool> {
        self.compile()
            .inspect_err(|err| warn!(%err, "rejected schema"))
    }

    fn compile(self) -> Result<DescriptorPool> {
        let mut by_name = HashMap::with_capacity(self.messages.len());
        for (index, def) in self.messages.iter().enumerate() {
            if by_name.insert(def.name.clone(), index).is_some() {
                return Err(invalid(format!("duplicate message type {}", def.name)));
            }
        }

        let mut messages = self
            .messages
            .iter()
            .map(|def| compile_message(def, &by_name))
            .collect::<Result<Vec<_>>>()?;

        for def in &self.extensions {
            let Some(&target) = by_name.get(&def.extendee) else {
                return Err(ModelError::UnknownMessage(def.extendee.clone()));
            };
            let extendee = &mut messages[target];
            let index = extendee.extensions.len();
            let field = compile_extension(def, extendee, index, &by_name)?;
            extendee.extensions.insert(field.number, field);
        }

        debug!(
            messages = messages.len(),
            extensions = self.extensions.len(),
            "built descriptor pool"
        );

        Ok(DescriptorPool {
            inner: Arc::new(PoolInner { messages, by_name }),
        })
    }
}

fn invalid(reason: String) -> ModelError {
    ModelError::InvalidSchema(reason)
}

fn compile_message(def: &MessageDef, known: &HashMap<String, usize>) -> Result<MessageType> {
    let mut names = HashSet::new();
    let mut numbers = HashSet::new();
    let mut fields = Vec::with_capacity(def.fields.len());
    let mut by_name = HashMap::with_capacity(def.fields.len());

    for (index, field) in def.fields.iter().enumerate() {
        if !names.insert(field.name.as_str()) {
            return Err(invalid(format!(
                "duplicate field name {}.{}",
                def.name, field.name
            )));
        }
        for number in claimed_numbers(field) {
            if number == 0 || !numbers.insert(number) {
                return Err(invalid(format!(
                    "invalid or duplicate field number {number} in {}",
                    def.name
                )));
            }
        }
        check_kind(&def.name, field, known)?;
        let presence = resolve_presence(&def.name, def.syntax, field)?;
        by_name.insert(field.name.clone(), index);
        fields.push(FieldDescriptor {
            name: field.name.clone(),
            number: field.number,
            index,
            kind: field.kind.clone(),
            presence,
        });
    }

    let mut extension_ranges = Vec::with_capacity(def.extension_ranges.len());
    for &(start, end) in &def.extension_ranges {
        if start == 0 || start > end {
            return Err(invalid(format!(
                "bad extension range {start}..={end} in {}",
                def.name
            )));
        }
        if let Some(n) = numbers.iter().find(|n| (start..=end).contains(*n)) {
            return Err(invalid(format!(
                "field number {n} of {} lies in an extension range",
                def.name
            )));
        }
        extension_ranges.push(start..=end);
    }

    Ok(MessageType {
        name: def.name.clone(),
        syntax: def.syntax,
        fields,
        by_name,
        extension_ranges,
        extensions: BTreeMap::new(),
    })
}

fn compile_extension(
    def: &ExtensionDef,
    extendee: &MessageType,
    index: usize,
    known: &HashMap<String, usize>,
) -> Result<FieldDescriptor> {
    let field = &def.field;
    if !extendee
        .extension_ranges
        .iter()
        .any(|r| r.contains(&field.number))
    {
        return Err(invalid(format!(
            "extension {} number {} is outside the extension ranges of {}",
            field.name, field.number, extendee.name
        )));
    }
    if extendee.extensions.contains_key(&field.number) {
        return Err(invalid(format!(
            "duplicate extension number {} on {}",
            field.number, extendee.name
        )));
    }
    if matches!(field.kind, Kind::Map { .. } | Kind::Oneof(_)) {
        return Err(invalid(format!(
            "extension {} cannot be a map or oneof",
            field.name
        )));
    }
    if field.presence == Some(PresenceRule::Implicit) {
        return Err(invalid(format!(
            "extension {} cannot use implicit presence",
            field.name
        )));
    }
    check_kind(&def.extendee, field, known)?;

    Ok(FieldDescriptor {
        name: field.name.clone(),
        number: field.number,
        index,
        kind: field.kind.clone(),
        presence: PresenceRule::Explicit,
    })
}

/// Field numbers a declaration occupies: a oneof claims each alternative's number.
fn claimed_numbers(field: &FieldDef) -> Vec<u32> {
    match &field.kind {
        Kind::Oneof(cases) => cases.iter().map(|c| c.number).collect(),
        _ => vec![field.number],
    }
}

fn check_kind(owner: &str, field: &FieldDef, known: &HashMap<String, usize>) -> Result<()> {
    if let Kind::Oneof(cases) = &field.kind {
        if cases.is_empty() {
            return Err(invalid(format!("oneof {owner}.{} has no alternatives", field.name)));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = cases.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(invalid(format!(
                "oneof {owner}.{} repeats alternative {}",
                field.name, dup.name
            )));
        }
    }
    for name in field.kind.message_refs() {
        if !known.contains_key(name) {
            return Err(ModelError::UnknownMessage(name.to_string()));
        }
    }
    Ok(())
}

fn resolve_presence(owner: &str, syntax: Syntax, field: &FieldDef) -> Result<PresenceRule> {
    match field.presence {
        Some(PresenceRule::Implicit) if !field.kind.is_singular_scalar() => Err(invalid(format!(
            "{owner}.{} cannot use implicit presence",
            field.name
        ))),
        Some(rule) => Ok(rule),
        None if syntax == Syntax::Proto3 && field.kind.is_singular_scalar() => {
            Ok(PresenceRule::Implicit)
        }
        None => Ok(PresenceRule::Explicit),
    }
}
