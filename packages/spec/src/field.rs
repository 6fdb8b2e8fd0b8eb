use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::Rule;

/// The closed set of field kinds an element can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    RichText,
    Text,
    Checkbox,
    Dropdown,
    Custom,
}

/// One choice in a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub text: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// A field's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    RichText(String),
    Text(String),
    Checkbox(bool),
    Dropdown(String),
    Custom(Value),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::RichText(_) => FieldKind::RichText,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Checkbox(_) => FieldKind::Checkbox,
            FieldValue::Dropdown(_) => FieldKind::Dropdown,
            FieldValue::Custom(_) => FieldKind::Custom,
        }
    }

    /// Whether the value counts as empty for `required`-style rules.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::RichText(s) | FieldValue::Text(s) | FieldValue::Dropdown(s) => s.is_empty(),
            FieldValue::Checkbox(checked) => !checked,
            FieldValue::Custom(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::String(s) => s.is_empty(),
                _ => false,
            },
        }
    }

    /// Character length, for values that have one.
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::RichText(s) | FieldValue::Text(s) | FieldValue::Dropdown(s) => {
                Some(s.chars().count())
            }
            FieldValue::Custom(Value::String(s)) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// The plain string behind text-like values.
    pub fn as_plain_text(&self) -> Option<&str> {
        match self {
            FieldValue::RichText(s) | FieldValue::Text(s) | FieldValue::Dropdown(s) => Some(s),
            _ => None,
        }
    }

    /// Serialize the value the way it is carried in node attributes.
    pub fn as_attr(&self) -> Value {
        match self {
            FieldValue::RichText(s) | FieldValue::Text(s) | FieldValue::Dropdown(s) => {
                Value::String(s.clone())
            }
            FieldValue::Checkbox(checked) => Value::Bool(*checked),
            FieldValue::Custom(value) => value.clone(),
        }
    }
}

/// Kind-specific options of a field description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldOptions {
    RichText {
        /// Content expression override for the field's container node.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_dom: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_dom: Option<Value>,
    },
    Text,
    Checkbox {
        default: bool,
    },
    Dropdown {
        options: Vec<DropdownOption>,
        default: String,
    },
    Custom {
        default: Value,
    },
}

/// Everything an element author declares about one field: its kind,
/// kind-specific options, and an ordered list of validation rules.
///
/// Descriptions are immutable once compiled; the compiler reads the options,
/// the plugin takes the rules.
#[derive(Debug)]
pub struct FieldDescription {
    options: FieldOptions,
    validators: Vec<Box<dyn Rule>>,
}

impl FieldDescription {
    pub fn rich_text() -> Self {
        Self {
            options: FieldOptions::RichText {
                content: None,
                to_dom: None,
                parse_dom: None,
            },
            validators: Vec::new(),
        }
    }

    pub fn text() -> Self {
        Self {
            options: FieldOptions::Text,
            validators: Vec::new(),
        }
    }

    pub fn checkbox(default: bool) -> Self {
        Self {
            options: FieldOptions::Checkbox { default },
            validators: Vec::new(),
        }
    }

    pub fn dropdown(options: Vec<DropdownOption>, default: impl Into<String>) -> Self {
        Self {
            options: FieldOptions::Dropdown {
                options,
                default: default.into(),
            },
            validators: Vec::new(),
        }
    }

    pub fn custom(default: Value) -> Self {
        Self {
            options: FieldOptions::Custom { default },
            validators: Vec::new(),
        }
    }

    /// Override the content expression of a rich-text field.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        if let FieldOptions::RichText {
            content: ref mut c, ..
        } = self.options
        {
            *c = Some(content.into());
        }
        self
    }

    pub fn with_to_dom(mut self, to_dom: Value) -> Self {
        if let FieldOptions::RichText {
            to_dom: ref mut t, ..
        } = self.options
        {
            *t = Some(to_dom);
        }
        self
    }

    pub fn with_parse_dom(mut self, parse_dom: Value) -> Self {
        if let FieldOptions::RichText {
            parse_dom: ref mut p,
            ..
        } = self.options
        {
            *p = Some(parse_dom);
        }
        self
    }

    pub fn with_validators(mut self, validators: Vec<Box<dyn Rule>>) -> Self {
        self.validators = validators;
        self
    }

    pub fn kind(&self) -> FieldKind {
        match self.options {
            FieldOptions::RichText { .. } => FieldKind::RichText,
            FieldOptions::Text => FieldKind::Text,
            FieldOptions::Checkbox { .. } => FieldKind::Checkbox,
            FieldOptions::Dropdown { .. } => FieldKind::Dropdown,
            FieldOptions::Custom { .. } => FieldKind::Custom,
        }
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn validators(&self) -> &[Box<dyn Rule>] {
        &self.validators
    }

    /// Move the rules out, leaving the description without validators.
    pub fn take_validators(&mut self) -> Vec<Box<dyn Rule>> {
        std::mem::take(&mut self.validators)
    }

    /// The value a field of this description starts with.
    pub fn default_value(&self) -> FieldValue {
        match &self.options {
            FieldOptions::RichText { .. } => FieldValue::RichText(String::new()),
            FieldOptions::Text => FieldValue::Text(String::new()),
            FieldOptions::Checkbox { default } => FieldValue::Checkbox(*default),
            FieldOptions::Dropdown { default, .. } => FieldValue::Dropdown(default.clone()),
            FieldOptions::Custom { default } => FieldValue::Custom(default.clone()),
        }
    }
}

/// An element's fields, in declaration order.
///
/// Order is significant: it drives the parent node's content expression and
/// the layout of the element's editing surfaces. Field names must be unique
/// within an element; duplicates are reported when the element is assembled
/// into a schema fragment.
#[derive(Debug, Default)]
pub struct FieldSpec {
    fields: Vec<(String, FieldDescription)>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, description: FieldDescription) -> Self {
        self.fields.push((name.into(), description));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescription> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescription)> {
        self.fields.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the rich-text fields, in declaration order.
    pub fn rich_text_field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, d)| d.kind() == FieldKind::RichText)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Move every field's rules out, keyed by field name in declaration
    /// order.
    pub fn take_validation_entries(&mut self) -> Vec<(String, Vec<Box<dyn Rule>>)> {
        self.fields
            .iter_mut()
            .map(|(name, description)| (name.clone(), description.take_validators()))
            .collect()
    }
}
