/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by clone and merge.
///
/// All of them mean the descriptors and the values handed to the engine
/// disagree. They are not retried and no data-validity errors exist.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot merge a {found} into a {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("field {message}.{field} holds a value that does not fit kind {expected}")]
    ShapeMismatch {
        message: String,
        field: String,
        expected: String,
    },

    #[error("message {message} carries unregistered extension {number}")]
    UnknownExtension { message: String, number: u32 },

    #[error("message nesting exceeds the configured limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
