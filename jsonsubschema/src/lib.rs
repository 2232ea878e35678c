mod atom;
pub mod checker;
pub mod config;
mod engine;
pub mod error;
mod handle;
mod normalizer;
mod rational;
mod types;
mod union;
pub mod validator;

#[cfg(test)]
#[path = "numeric_tests.rs"]
mod numeric_tests;



// Re-export commonly used types
pub use checker::{SubschemaCheckResult, SubschemaChecker, is_equivalent, is_subschema};
pub use config::CheckerConfig;
pub use error::SubschemaError;
pub use validator::{Draft4Validator, NoopValidator, SchemaValidator};
