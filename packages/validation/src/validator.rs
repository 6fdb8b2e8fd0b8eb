use std::collections::BTreeMap;

use inlay_spec::{FieldSpec, FieldValues, Rule, ValidationError};

/// Per-field validation results. Always fully recomputed: every field in the
/// validation map appears, with an empty list when the field is valid.
pub type ErrorMap = BTreeMap<String, Vec<ValidationError>>;

/// An ordered assignment of rules to field names.
#[derive(Debug, Default)]
pub struct ValidationMap {
    entries: Vec<(String, Vec<Box<dyn Rule>>)>,
}

impl ValidationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: Vec<Box<dyn Rule>>) -> Self {
        self.entries.push((name.into(), rules));
        self
    }

    pub fn from_entries(entries: Vec<(String, Vec<Box<dyn Rule>>)>) -> Self {
        Self { entries }
    }

    /// Pull every field's declared rules out of a field spec.
    pub fn from_field_spec(spec: &mut FieldSpec) -> Self {
        Self::from_entries(spec.take_validation_entries())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validate a value map against a validation map.
pub fn create_validator(map: ValidationMap) -> ElementValidator {
    ElementValidator { map }
}

/// The compiled form of a validation map.
///
/// Every declared rule runs on every call, in declaration order, with no
/// short-circuiting and no deduplication; a field absent from the input is
/// validated against `None` so partial data still produces a complete
/// error map.
#[derive(Debug)]
pub struct ElementValidator {
    map: ValidationMap,
}

impl ElementValidator {
    pub fn validate(&self, values: &FieldValues) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for (field, rules) in &self.map.entries {
            let value = values.get(field);
            let failures = rules
                .iter()
                .flat_map(|rule| rule.validate(field, value))
                .collect();
            errors.insert(field.clone(), failures);
        }
        errors
    }

    /// Whether any field currently fails.
    pub fn has_errors(&self, values: &FieldValues) -> bool {
        self.validate(values).values().any(|failures| !failures.is_empty())
    }
}
