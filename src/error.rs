//! Error types for the proto-rbi-types crate.

/// Errors that can occur while loading a schema or resolving field types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The field's element type is outside the scalar/enum/message taxonomy
    /// (for example a proto2 `group`).
    #[error("unsupported field type for field '{field}' in message {message}")]
    UnsupportedType { message: String, field: String },

    /// The schema document is malformed.
    #[error("schema error: {0}")]
    Schema(String),

    /// A field references a message or enum that is not in the schema.
    #[error("field '{field}' references unknown type '{type_name}'")]
    UnresolvedType { field: String, type_name: String },

    /// JSON parse error with context.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
