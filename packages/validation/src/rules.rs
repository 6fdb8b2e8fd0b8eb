use inlay_spec::{FieldValue, Rule, ValidationError};

#[derive(Debug)]
struct Required;

impl Rule for Required {
    fn validate(&self, field: &str, value: Option<&FieldValue>) -> Vec<ValidationError> {
        let empty = value.map_or(true, FieldValue::is_empty);
        if empty {
            vec![ValidationError::new(
                "Required",
                format!("{field} is required"),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Fails when the value is absent or empty.
pub fn required() -> Box<dyn Rule> {
    Box::new(Required)
}

#[derive(Debug)]
struct MaxLength {
    max: usize,
}

impl Rule for MaxLength {
    fn validate(&self, field: &str, value: Option<&FieldValue>) -> Vec<ValidationError> {
        match value.and_then(FieldValue::len) {
            Some(len) if len > self.max => vec![ValidationError::new(
                format!("Too long: {len}/{}", self.max),
                format!("{field} is too long: {len}/{}", self.max),
            )],
            _ => Vec::new(),
        }
    }
}

/// Fails when the value's length exceeds `max`. Values without a length
/// always pass.
pub fn max_length(max: usize) -> Box<dyn Rule> {
    Box::new(MaxLength { max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fails_on_absent_and_empty_values() {
        let rule = required();
        assert_eq!(
            rule.validate("field1", None),
            vec![ValidationError::new("Required", "field1 is required")]
        );
        assert_eq!(
            rule.validate("field1", Some(&FieldValue::Text(String::new()))),
            vec![ValidationError::new("Required", "field1 is required")]
        );
        assert_eq!(
            rule.validate("field1", Some(&FieldValue::Checkbox(false))),
            vec![ValidationError::new("Required", "field1 is required")]
        );
        assert!(rule
            .validate("field1", Some(&FieldValue::Text("x".to_string())))
            .is_empty());
    }

    #[test]
    fn test_max_length_reports_length_and_limit() {
        let rule = max_length(5);
        assert_eq!(
            rule.validate("field2", Some(&FieldValue::Text("Not OK!".to_string()))),
            vec![ValidationError::new(
                "Too long: 7/5",
                "field2 is too long: 7/5"
            )]
        );
        assert!(rule
            .validate("field2", Some(&FieldValue::Text("OK!".to_string())))
            .is_empty());
    }

    #[test]
    fn test_max_length_ignores_values_without_a_length() {
        let rule = max_length(5);
        assert!(rule.validate("done", Some(&FieldValue::Checkbox(true))).is_empty());
        assert!(rule.validate("done", None).is_empty());
    }
}
