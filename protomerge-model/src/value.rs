//! Value model stored inside message slots.
//!
//! A slot holds one [`FieldValue`]; its elements are [`Value`]s. Neither type
//! implements `Clone`: copies that must not alias their source go through the
//! engine, which walks the descriptors.

use crate::message::Message;
use crate::schema::{MapKeyType, ScalarType};
use std::collections::BTreeMap;

/// A single typed element.
#[derive(Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Enum(i32),
    Bytes(Vec<u8>),
    Message(Box<Message>),
}

impl Value {
    /// The scalar type this value carries, or `None` for bytes and messages.
    #[must_use]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Bool(_) => Some(ScalarType::Bool),
            Self::I32(_) => Some(ScalarType::Int32),
            Self::I64(_) => Some(ScalarType::Int64),
            Self::U32(_) => Some(ScalarType::Uint32),
            Self::U64(_) => Some(ScalarType::Uint64),
            Self::F32(_) => Some(ScalarType::Float),
            Self::F64(_) => Some(ScalarType::Double),
            Self::String(_) => Some(ScalarType::String),
            Self::Enum(_) => Some(ScalarType::Enum),
            Self::Bytes(_) | Self::Message(_) => None,
        }
    }

    /// True if this is the zero value of its type.
    ///
    /// Messages are never zero: a present message is always "set".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(v) => !*v,
            Self::I32(v) | Self::Enum(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::U32(v) => *v == 0,
            Self::U64(v) => *v == 0,
            Self::F32(v) => *v == 0.0,
            Self::F64(v) => *v == 0.0,
            Self::String(v) => v.is_empty(),
            Self::Bytes(v) => v.is_empty(),
            Self::Message(_) => false,
        }
    }

    /// The zero value of a scalar type.
    #[must_use]
    pub fn zero_of(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Bool => Self::Bool(false),
            ScalarType::Int32 => Self::I32(0),
            ScalarType::Int64 => Self::I64(0),
            ScalarType::Uint32 => Self::U32(0),
            ScalarType::Uint64 => Self::U64(0),
            ScalarType::Float => Self::F32(0.0),
            ScalarType::Double => Self::F64(0.0),
            ScalarType::String => Self::String(String::new()),
            ScalarType::Enum => Self::Enum(0),
        }
    }

    /// Copies a scalar or bytes value into fresh storage.
    ///
    /// Returns `None` for messages, which need a descriptor-driven clone.
    #[must_use]
    pub fn copy_scalar(&self) -> Option<Self> {
        Some(match self {
            Self::Bool(v) => Self::Bool(*v),
            Self::I32(v) => Self::I32(*v),
            Self::I64(v) => Self::I64(*v),
            Self::U32(v) => Self::U32(*v),
            Self::U64(v) => Self::U64(*v),
            Self::F32(v) => Self::F32(*v),
            Self::F64(v) => Self::F64(*v),
            Self::String(v) => Self::String(v.clone()),
            Self::Enum(v) => Self::Enum(*v),
            Self::Bytes(v) => Self::Bytes(v.to_vec()),
            Self::Message(_) => return None,
        })
    }

    /// The nested message, if this is one.
    #[must_use]
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(&**m),
            _ => None,
        }
    }

    /// Mutable access to the nested message, if this is one.
    #[must_use]
    pub fn as_message_mut(&mut self) -> Option<&mut Message> {
        match self {
            Self::Message(m) => Some(&mut **m),
            _ => None,
        }
    }

    /// The byte payload, if this is bytes.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The text, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }

            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    Self::Singular(Value::from(v))
                }
            }
        )*
    };
}

impl_value_from!(
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
);

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for FieldValue {
    fn from(v: &[u8; N]) -> Self {
        Self::Singular(Value::from(v))
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Self::Message(Box::new(m))
    }
}

impl From<Message> for FieldValue {
    fn from(m: Message) -> Self {
        Self::Singular(Value::from(m))
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        Self::Singular(v)
    }
}

impl From<OneofValue> for FieldValue {
    fn from(v: OneofValue) -> Self {
        Self::Oneof(v)
    }
}

/// A map key. Ordered so map iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl MapKey {
    /// The key type this key belongs to.
    #[must_use]
    pub fn key_type(&self) -> MapKeyType {
        match self {
            Self::Bool(_) => MapKeyType::Bool,
            Self::I32(_) => MapKeyType::Int32,
            Self::I64(_) => MapKeyType::Int64,
            Self::U32(_) => MapKeyType::Uint32,
            Self::U64(_) => MapKeyType::Uint64,
            Self::String(_) => MapKeyType::String,
        }
    }
}

impl From<bool> for MapKey {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for MapKey {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u32> for MapKey {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for MapKey {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

/// The currently selected alternative of a oneof field.
#[derive(Debug, PartialEq)]
pub struct OneofValue {
    /// Name of the selected alternative.
    pub case: String,
    pub value: Value,
}

impl OneofValue {
    /// Selects the alternative `case` holding `value`.
    pub fn new(case: &str, value: impl Into<Value>) -> Self {
        Self {
            case: case.into(),
            value: value.into(),
        }
    }
}

/// Contents of a present field slot.
///
/// An absent slot is represented by `None` at the message level, so a
/// `List` or `Map` here is present even when empty.
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Singular(Value),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
    Oneof(OneofValue),
}

impl FieldValue {
    /// Builds a list from anything convertible to values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// A present list with no elements.
    #[must_use]
    pub fn empty_list() -> Self {
        Self::List(Vec::new())
    }

    /// Builds a map from key/value pairs.
    pub fn map<K: Into<MapKey>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A present map with no entries.
    #[must_use]
    pub fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Selects a oneof alternative.
    pub fn oneof(case: &str, value: impl Into<Value>) -> Self {
        Self::Oneof(OneofValue::new(case, value))
    }

    /// The single value of a singular field.
    #[must_use]
    pub fn as_singular(&self) -> Option<&Value> {
        match self {
            Self::Singular(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable access to a singular field's value.
    #[must_use]
    pub fn as_singular_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::Singular(v) => Some(v),
            _ => None,
        }
    }

    /// The elements of a repeated field.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable access to a repeated field's elements.
    #[must_use]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// The entries of a map field.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable access to a map field's entries.
    #[must_use]
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<MapKey, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The selected alternative of a oneof.
    #[must_use]
    pub fn as_oneof(&self) -> Option<&OneofValue> {
        match self {
            Self::Oneof(o) => Some(o),
            _ => None,
        }
    }

    /// True for an empty list or map.
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Self::List(v) => v.is_empty(),
            Self::Map(m) => m.is_empty(),
            _ => false,
        }
    }
}
