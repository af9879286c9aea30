use serde::{Deserialize, Serialize};

/// Schema generation a message type was declared in.
///
/// Decides the default [`PresenceRule`] of its singular scalar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// Every field tracks presence explicitly.
    #[default]
    Proto2,
    /// Singular scalars use implicit presence: the zero value means "not set".
    Proto3,
}

/// Whether a field distinguishes "absent" from "present with the zero value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceRule {
    /// Absent and present-with-zero are distinct states.
    Explicit,
    /// Only a non-zero value counts as set.
    Implicit,
}

/// Primitive value types a scalar field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Enum,
}

/// Types allowed as map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKeyType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    String,
}

/// Kind of a single element: a repeated item, a map value or a oneof payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Scalar(ScalarType),
    Bytes,
    /// Nested message, referenced by full type name.
    Message(String),
}

/// Shape of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Scalar(ScalarType),
    Bytes,
    Message(String),
    RepeatedScalar(ScalarType),
    RepeatedBytes,
    RepeatedMessage(String),
    Map { key: MapKeyType, value: ValueKind },
    Oneof(Vec<OneofCase>),
}

impl Kind {
    /// The element kind of singular and repeated fields.
    ///
    /// Returns `None` for maps and oneofs, whose elements are described
    /// separately.
    #[must_use]
    pub fn element(&self) -> Option<ValueKind> {
        match self {
            Self::Scalar(t) | Self::RepeatedScalar(t) => Some(ValueKind::Scalar(*t)),
            Self::Bytes | Self::RepeatedBytes => Some(ValueKind::Bytes),
            Self::Message(name) | Self::RepeatedMessage(name) => {
                Some(ValueKind::Message(name.clone()))
            }
            Self::Map { .. } | Self::Oneof(_) => None,
        }
    }

    /// True for `Scalar` and `Bytes`, the only kinds that may use implicit presence.
    #[must_use]
    pub fn is_singular_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Bytes)
    }

    /// True for the three repeated kinds.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        matches!(
            self,
            Self::RepeatedScalar(_) | Self::RepeatedBytes | Self::RepeatedMessage(_)
        )
    }

    /// Every message type name this kind refers to.
    pub fn message_refs(&self) -> Vec<&str> {
        match self {
            Self::Message(name) | Self::RepeatedMessage(name) => vec![name.as_str()],
            Self::Map {
                value: ValueKind::Message(name),
                ..
            } => vec![name.as_str()],
            Self::Oneof(cases) => cases
                .iter()
                .filter_map(|c| match &c.kind {
                    ValueKind::Message(name) => Some(name.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One alternative of a oneof field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneofCase {
    pub name: String,
    pub number: u32,
    pub kind: ValueKind,
}

impl OneofCase {
    /// Declares one alternative of a oneof.
    pub fn new(name: &str, number: u32, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
        }
    }
}

/// Declaration of a single field, as written in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    pub kind: Kind,
    /// Overrides the presence rule implied by the message's [`Syntax`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceRule>,
}

impl FieldDef {
    /// Creates a field of any kind with the syntax-default presence.
    pub fn new(name: &str, number: u32, kind: Kind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
            presence: None,
        }
    }

    /// Shorthand for a singular scalar field.
    pub fn scalar(name: &str, number: u32, scalar: ScalarType) -> Self {
        Self::new(name, number, Kind::Scalar(scalar))
    }

    /// Shorthand for a singular bytes field.
    pub fn bytes(name: &str, number: u32) -> Self {
        Self::new(name, number, Kind::Bytes)
    }

    /// Shorthand for a nested message field.
    pub fn message(name: &str, number: u32, type_name: &str) -> Self {
        Self::new(name, number, Kind::Message(type_name.into()))
    }

    /// Shorthand for a repeated scalar field.
    pub fn repeated_scalar(name: &str, number: u32, scalar: ScalarType) -> Self {
        Self::new(name, number, Kind::RepeatedScalar(scalar))
    }

    /// Shorthand for a repeated bytes field.
    pub fn repeated_bytes(name: &str, number: u32) -> Self {
        Self::new(name, number, Kind::RepeatedBytes)
    }

    /// Shorthand for a repeated message field.
    pub fn repeated_message(name: &str, number: u32, type_name: &str) -> Self {
        Self::new(name, number, Kind::RepeatedMessage(type_name.into()))
    }

    /// Shorthand for a map field.
    pub fn map(name: &str, number: u32, key: MapKeyType, value: ValueKind) -> Self {
        Self::new(name, number, Kind::Map { key, value })
    }

    /// Shorthand for a oneof field. `number` is the number of the first
    /// alternative and only orders the field among its siblings.
    pub fn oneof(name: &str, cases: Vec<OneofCase>) -> Self {
        let number = cases.iter().map(|c| c.number).min().unwrap_or(0);
        Self::new(name, number, Kind::Oneof(cases))
    }

    /// Sets an explicit presence rule.
    #[must_use]
    pub fn with_presence(mut self, presence: PresenceRule) -> Self {
        self.presence = Some(presence);
        self
    }
}

/// Declaration of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub syntax: Syntax,
    pub fields: Vec<FieldDef>,
    /// Inclusive field-number ranges open to extensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_ranges: Vec<(u32, u32)>,
}

impl MessageDef {
    /// Declares a message type with no extension ranges.
    pub fn new(name: &str, syntax: Syntax, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            syntax,
            fields,
            extension_ranges: Vec::new(),
        }
    }

    /// Opens an inclusive range of field numbers to extensions.
    #[must_use]
    pub fn with_extension_range(mut self, start: u32, end: u32) -> Self {
        self.extension_ranges.push((start, end));
        self
    }
}

/// Declaration of an extension field attached to another message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDef {
    /// Full name of the message being extended.
    pub extendee: String,
    pub field: FieldDef,
}

impl ExtensionDef {
    /// Declares `field` as an extension of `extendee`.
    pub fn new(extendee: &str, field: FieldDef) -> Self {
        Self {
            extendee: extendee.into(),
            field,
        }
    }
}

/// A complete schema document: every message and extension of one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub messages: Vec<MessageDef>,
    #[serde(default)]
    pub extensions: Vec<ExtensionDef>,
}
