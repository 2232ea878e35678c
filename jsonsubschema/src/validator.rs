//! Meta-schema validation of input documents.
//!
//! The engine never normalizes a document that failed validation; the
//! validator is injected so callers can swap the dialect check.

use serde_json::Value;

use crate::error::SubschemaError;

pub trait SchemaValidator: Send + Sync {
    /// Checks one whole input document.
    ///
    /// # Errors
    /// Returns `MalformedSchema` describing the first violation.
    fn validate(&self, schema: &Value) -> Result<(), SubschemaError>;
}

/// Validates against the draft-04 meta-schema shipped with `jsonschema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Draft4Validator;

impl SchemaValidator for Draft4Validator {
    fn validate(&self, schema: &Value) -> Result<(), SubschemaError> {
        jsonschema::draft4::meta::validate(schema).map_err(|e| {
            tracing::debug!("meta-schema violation: {}", e);
            SubschemaError::malformed(e.to_string())
        })
    }
}

/// Accepts every document. Used when validation is disabled in the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl SchemaValidator for NoopValidator {
    fn validate(&self, _schema: &Value) -> Result<(), SubschemaError> {
        Ok(())
    }
}
