use thiserror::Error;

/// Failure to decide a subschema question.
///
/// Neither variant means "not a subschema": callers should read an error as
/// "cannot be decided for this input".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubschemaError {
    /// The document is not a valid draft-04 schema (meta-schema violation,
    /// dangling local `$ref`, non-decimal numeric literal).
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),
    /// The document uses a construct the decision procedures cannot model
    /// soundly, or a resource bound was exceeded.
    #[error("Unsupported schema construct: {0}")]
    UnsupportedConstruct(String),
}

impl SubschemaError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSchema(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(msg.into())
    }

    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedConstruct(_))
    }
}
