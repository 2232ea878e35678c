use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SubschemaError;

/// Resource bounds for one subschema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Maximum nesting of recursive sub-schema comparisons (array items,
    /// object properties) before giving up.
    pub max_depth: usize,
    /// Maximum number of atoms a single type slot may hold after normalization.
    pub max_atoms: usize,
    /// Maximum number of residue classes scanned when looking for a numeric
    /// witness under combined `multipleOf` constraints.
    pub max_residue_classes: u64,
    /// Run the draft-04 meta-schema validator on every input document.
    pub validate_schemas: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            max_depth: 64,
            max_atoms: 1024,
            max_residue_classes: 100_000,
            validate_schemas: true,
        }
    }
}

impl CheckerConfig {
    /// Parses a configuration object. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `MalformedSchema` if the text is not a JSON object with the
    /// expected field types.
    pub fn from_json(text: &str) -> Result<Self, SubschemaError> {
        serde_json::from_str(text)
            .map_err(|e| SubschemaError::malformed(format!("invalid checker config: {e}")))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    /// Returns `MalformedSchema` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SubschemaError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SubschemaError::malformed(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }
}
