//! Descriptor-driven deep clone and merge for protomerge messages.
//!
//! This crate provides the two operations every message consumer needs:
//!
//! - [`clone_message`]: an independent deep copy; no list, map, bytes or
//!   nested message of the result shares storage with the source
//! - [`merge`]: folds a source message into a destination of the same type,
//!   field by field, according to the field's kind and presence rule
//!
//! Both walk the [`MessageDescriptor`](protomerge_model::MessageDescriptor)
//! of the message, so they work for any registered type without generated
//! code. [`equal`] is the deep structural equality used to check results.
//!
//! The free functions use a default [`MergeEngine`]; build one explicitly to
//! enable per-field tracing or a nesting limit through [`EngineConfig`].

mod clone;
mod config;
mod engine;
mod error;
mod extension;
mod merge;

pub use config::EngineConfig;
pub use engine::MergeEngine;
pub use error::{EngineError, EngineResult};

use protomerge_model::Message;

/// Deep-copies a message with the default engine.
pub fn clone_message(src: &Message) -> EngineResult<Message> {
    MergeEngine::default().clone_message(src)
}

/// Deep-copies an optional message; `None` stays `None`.
pub fn clone_optional(src: Option<&Message>) -> EngineResult<Option<Message>> {
    MergeEngine::default().clone_optional(src)
}

/// Merges `src` into `dst` with the default engine.
pub fn merge(dst: &mut Message, src: &Message) -> EngineResult<()> {
    MergeEngine::default().merge(dst, src)
}

/// Returns `src` merged into a copy of `dst`, leaving both untouched.
pub fn merged(dst: &Message, src: &Message) -> EngineResult<Message> {
    MergeEngine::default().merged(dst, src)
}

/// Deep structural equality. Two `None`s are equal.
#[must_use]
pub fn equal(a: Option<&Message>, b: Option<&Message>) -> bool {
    a == b
}
