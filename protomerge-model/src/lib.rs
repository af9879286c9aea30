//! Field descriptor model for protomerge.
//!
//! Defines everything the merge and clone engine reads:
//! - [`SchemaDef`] / [`MessageDef`] / [`FieldDef`]: serde-friendly schema declarations
//! - [`DescriptorPool`]: the compiled, immutable registry built from them
//! - [`MessageDescriptor`] / [`FieldDescriptor`]: ordered field lists with kind and presence
//! - [`Message`]: a dynamic message value with checked accessors
//! - [`ExtensionSet`]: the per-instance side table of extension values
//!
//! The pool is built once per schema and is safe to share between threads.
//! Messages carry a handle to their descriptor, so any code holding a message
//! can walk its fields without knowing its type statically.

mod descriptor;
mod eq;
mod error;
mod extension;
mod message;
mod schema;
mod value;

pub use descriptor::{DescriptorPool, FieldDescriptor, MessageDescriptor, PoolBuilder};
pub use error::{ModelError, Result};
pub use extension::ExtensionSet;
pub use message::Message;
pub use schema::{
    ExtensionDef, FieldDef, Kind, MapKeyType, MessageDef, OneofCase, PresenceRule, ScalarType,
    SchemaDef, Syntax, ValueKind,
};
pub use value::{FieldValue, MapKey, OneofValue, Value};
