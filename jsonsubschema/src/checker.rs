use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CheckerConfig;
use crate::engine::Engine;
use crate::error::SubschemaError;
use crate::validator::{Draft4Validator, NoopValidator, SchemaValidator};

/// Both directions of a subschema check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubschemaCheckResult {
    pub lhs_sub_rhs: bool,
    pub rhs_sub_lhs: bool,
    pub equivalent: bool,
}

/// Entry point for subschema checks.
///
/// Each call builds a fresh engine, so a checker can be shared across
/// threads and reused freely.
pub struct SubschemaChecker {
    config: CheckerConfig,
    validator: Box<dyn SchemaValidator>,
}

impl Default for SubschemaChecker {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}

impl SubschemaChecker {
    /// Checker using the draft-04 meta-schema validator, or no validation
    /// when `config.validate_schemas` is off.
    #[must_use]
    pub fn new(config: CheckerConfig) -> Self {
        let validator: Box<dyn SchemaValidator> = if config.validate_schemas {
            Box::new(Draft4Validator)
        } else {
            Box::new(NoopValidator)
        };
        SubschemaChecker { config, validator }
    }

    #[must_use]
    pub fn with_validator(config: CheckerConfig, validator: Box<dyn SchemaValidator>) -> Self {
        SubschemaChecker { config, validator }
    }

    #[must_use]
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Whether every value valid under `lhs` is valid under `rhs`.
    ///
    /// # Errors
    /// `MalformedSchema` if either document fails validation (`lhs` is
    /// checked first) or holds a dangling local reference;
    /// `UnsupportedConstruct` if the check needs a construct that cannot be
    /// decided or exceeds a configured bound.
    pub fn is_subschema(&self, lhs: &Value, rhs: &Value) -> Result<bool, SubschemaError> {
        self.validate(lhs, rhs)?;
        let mut cx = Engine::new(&self.config);
        let a = cx.add_document(lhs.clone());
        let b = cx.add_document(rhs.clone());
        let verdict = cx.is_sub(&a, &b)?;
        tracing::debug!("lhs <: rhs = {}", verdict);
        Ok(verdict)
    }

    /// Whether `lhs` and `rhs` accept exactly the same values.
    ///
    /// # Errors
    /// Same conditions as [`SubschemaChecker::is_subschema`].
    pub fn is_equivalent(&self, lhs: &Value, rhs: &Value) -> Result<bool, SubschemaError> {
        Ok(self.check(lhs, rhs)?.equivalent)
    }

    /// Decides both directions with one shared engine.
    ///
    /// # Errors
    /// Same conditions as [`SubschemaChecker::is_subschema`].
    pub fn check(&self, lhs: &Value, rhs: &Value) -> Result<SubschemaCheckResult, SubschemaError> {
        self.validate(lhs, rhs)?;
        let mut cx = Engine::new(&self.config);
        let a = cx.add_document(lhs.clone());
        let b = cx.add_document(rhs.clone());
        let lhs_sub_rhs = cx.is_sub(&a, &b)?;
        let rhs_sub_lhs = cx.is_sub(&b, &a)?;
        tracing::debug!(
            "lhs <: rhs = {}, rhs <: lhs = {}",
            lhs_sub_rhs,
            rhs_sub_lhs
        );
        Ok(SubschemaCheckResult {
            lhs_sub_rhs,
            rhs_sub_lhs,
            equivalent: lhs_sub_rhs && rhs_sub_lhs,
        })
    }

    fn validate(&self, lhs: &Value, rhs: &Value) -> Result<(), SubschemaError> {
        self.validator.validate(lhs)?;
        self.validator.validate(rhs)
    }
}

/// [`SubschemaChecker::is_subschema`] with the default configuration.
///
/// # Errors
/// See [`SubschemaChecker::is_subschema`].
pub fn is_subschema(lhs: &Value, rhs: &Value) -> Result<bool, SubschemaError> {
    SubschemaChecker::default().is_subschema(lhs, rhs)
}

/// [`SubschemaChecker::is_equivalent`] with the default configuration.
///
/// # Errors
/// See [`SubschemaChecker::is_subschema`].
pub fn is_equivalent(lhs: &Value, rhs: &Value) -> Result<bool, SubschemaError> {
    SubschemaChecker::default().is_equivalent(lhs, rhs)
}
