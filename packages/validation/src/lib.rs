//! # Inlay Validation
//!
//! Pure, synchronous validation of field values. A [`ValidationMap`] assigns
//! an ordered list of rules to each field name; [`create_validator`] turns
//! the map into a function from a flat value map to an [`ErrorMap`]. The
//! engine knows nothing about the document tree.

mod rules;
mod validator;

pub use rules::{max_length, required};
pub use validator::{create_validator, ElementValidator, ErrorMap, ValidationMap};
