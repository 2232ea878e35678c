//! Per-type decision procedures.

pub mod array;
pub mod numeric;
pub mod object;
pub mod scalar;
pub mod string;

pub use array::ArrayAtom;
pub use numeric::NumericAtom;
pub use object::ObjectAtom;
pub use scalar::{BooleanAtom, NullAtom};
pub use string::StringAtom;
