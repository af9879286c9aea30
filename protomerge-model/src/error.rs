/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building a descriptor pool or accessing message fields.
///
/// Every variant describes a mismatch between a schema and the code using it;
/// none of them is caused by the contents of a well-typed message.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("unknown message type: {0}")]
    UnknownMessage(String),

    #[error("message {message} has no field named {field}")]
    UnknownField { message: String, field: String },

    #[error("message {message} has no extension numbered {number}")]
    UnknownExtension { message: String, number: u32 },

    #[error("field {message}.{field}: expected {expected}")]
    ShapeMismatch {
        message: String,
        field: String,
        expected: String,
    },
}
