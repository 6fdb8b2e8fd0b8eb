use serde::{Deserialize, Serialize};

use crate::field::FieldValue;

/// One validation failure: a machine-readable kind plus a message fit for
/// display next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub error: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// A validation rule: a pure mapping from a field value to a list of
/// failures, empty when the value is valid.
///
/// Rules receive `None` for fields absent from the data being validated, so
/// a rule like `required` can reject missing values. Rules must not carry
/// state between calls.
pub trait Rule: std::fmt::Debug {
    fn validate(&self, field: &str, value: Option<&FieldValue>) -> Vec<ValidationError>;
}
