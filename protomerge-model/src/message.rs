use crate::descriptor::{FieldDescriptor, MessageDescriptor};
use crate::error::{ModelError, Result};
use crate::extension::ExtensionSet;
use crate::schema::Kind;
use crate::value::{FieldValue, Value};
use std::fmt;
use std::iter;

/// A dynamic message: one storage slot per declared field plus an extension
/// side table.
///
/// Slots are `None` while the field is absent. Values written through
/// [`Message::set`] are checked against the field's kind; the index-based
/// [`Message::slot_mut`] is unchecked and meant for code that walks the
/// descriptor itself.
pub struct Message {
    descriptor: MessageDescriptor,
    fields: Vec<Option<FieldValue>>,
    extensions: ExtensionSet,
}

impl Message {
    /// Creates a message with every field absent.
    #[must_use]
    pub fn new(descriptor: MessageDescriptor) -> Self {
        let fields = iter::repeat_with(|| None)
            .take(descriptor.fields().len())
            .collect();
        Self {
            descriptor,
            fields,
            extensions: ExtensionSet::new(),
        }
    }

    /// The descriptor of this message's type.
    #[must_use]
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Fully qualified name of this message's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.descriptor.full_name()
    }

    fn field_index(&self, name: &str) -> Result<usize> {
        self.descriptor
            .field_by_name(name)
            .map(FieldDescriptor::index)
            .ok_or_else(|| ModelError::UnknownField {
                message: self.type_name().to_string(),
                field: name.to_string(),
            })
    }

    /// The value of a field, or `None` when absent or undeclared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let index = self.descriptor.field_by_name(name)?.index();
        self.fields[index].as_ref()
    }

    /// Mutable access to a present field.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        let index = self.descriptor.field_by_name(name)?.index();
        self.fields[index].as_mut()
    }

    /// Shorthand for reading a singular field's value.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_singular)
    }

    /// Shorthand for reading a nested message field.
    #[must_use]
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.get_value(name).and_then(Value::as_message)
    }

    /// True if the field is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stores a value after checking it fits the field's kind.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let index = self.field_index(name)?;
        let value = value.into();
        let field = &self.descriptor.fields()[index];
        if !self.descriptor.accepts(field, &value) {
            return Err(shape_mismatch(&self.descriptor, field));
        }
        self.fields[index] = Some(value);
        Ok(())
    }

    /// Makes a field absent, returning what it held.
    pub fn clear(&mut self, name: &str) -> Result<Option<FieldValue>> {
        let index = self.field_index(name)?;
        Ok(self.fields[index].take())
    }

    /// Returns the nested message stored in `name`, allocating an empty one
    /// of the declared type when the field is absent.
    pub fn ensure_nested(&mut self, name: &str) -> Result<&mut Message> {
        let index = self.field_index(name)?;
        let field = &self.descriptor.fields()[index];
        let Kind::Message(type_name) = field.kind() else {
            return Err(shape_mismatch(&self.descriptor, field));
        };
        let slot = &mut self.fields[index];
        if slot.is_none() {
            let nested = self
                .descriptor
                .resolve(type_name)
                .ok_or_else(|| ModelError::UnknownMessage(type_name.clone()))?;
            *slot = Some(FieldValue::Singular(Value::Message(Box::new(Message::new(
                nested,
            )))));
        }
        match slot {
            Some(FieldValue::Singular(Value::Message(m))) => Ok(&mut **m),
            _ => Err(shape_mismatch(&self.descriptor, field)),
        }
    }

    /// The slot at a descriptor index.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index).and_then(Option::as_ref)
    }

    /// Unchecked mutable access to the slot at a descriptor index.
    ///
    /// Returns `None` only for an index outside the descriptor's field list.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Option<FieldValue>> {
        self.fields.get_mut(index)
    }

    /// True when every field is absent and no extension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(Option::is_none) && self.extensions.is_empty()
    }

    /// The extension side table.
    #[must_use]
    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    /// Unchecked access to the extension side table.
    pub fn extensions_mut(&mut self) -> &mut ExtensionSet {
        &mut self.extensions
    }

    /// The value of a set extension.
    #[must_use]
    pub fn get_extension(&self, number: u32) -> Option<&FieldValue> {
        self.extensions.get(number)
    }

    /// Stores an extension value after checking it against the registered
    /// extension descriptor.
    pub fn set_extension(&mut self, number: u32, value: impl Into<FieldValue>) -> Result<()> {
        let Some(field) = self.descriptor.extension(number) else {
            return Err(ModelError::UnknownExtension {
                message: self.type_name().to_string(),
                number,
            });
        };
        let value = value.into();
        if !self.descriptor.accepts(field, &value) {
            return Err(shape_mismatch(&self.descriptor, field));
        }
        self.extensions.insert(number, value);
        Ok(())
    }

    /// Unsets an extension, returning its value.
    pub fn clear_extension(&mut self, number: u32) -> Option<FieldValue> {
        self.extensions.remove(number)
    }
}

fn shape_mismatch(owner: &MessageDescriptor, field: &FieldDescriptor) -> ModelError {
    ModelError::ShapeMismatch {
        message: owner.full_name().to_string(),
        field: field.name().to_string(),
        expected: format!("{:?}", field.kind()),
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.type_name());
        for (field, slot) in self.descriptor.fields().iter().zip(&self.fields) {
            if let Some(value) = slot {
                out.field(field.name(), value);
            }
        }
        if !self.extensions.is_empty() {
            out.field("extensions", &self.extensions);
        }
        out.finish()
    }
}
