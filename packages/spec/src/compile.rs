use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use inlay_doc::NodeTemplate;

use crate::field::{FieldDescription, FieldKind, FieldOptions, FieldValue};

/// Compile one field description into a schema node template and the field's
/// default value.
///
/// Rich-text fields become container nodes: the content expression is the
/// caller's override or `paragraph`, and custom `to_dom`/`parse_dom` hooks
/// are passed through unchanged. Every other kind becomes an atomic node
/// whose value is carried in the `fields` attribute.
pub fn compile_field(description: &FieldDescription) -> (NodeTemplate, FieldValue) {
    let default = description.default_value();
    let template = match description.options() {
        FieldOptions::RichText {
            content,
            to_dom,
            parse_dom,
        } => {
            let mut template =
                NodeTemplate::container(content.clone().unwrap_or_else(|| "paragraph".to_string()));
            if let Some(to_dom) = to_dom {
                template = template.with_to_dom(to_dom.clone());
            }
            if let Some(parse_dom) = parse_dom {
                template = template.with_parse_dom(parse_dom.clone());
            }
            template
        }
        _ => NodeTemplate::atom(json!({ "fields": default.as_attr() })),
    };
    (template, default)
}

/// One compiled field: everything the runtime needs to know about it, with
/// the author-supplied closures stripped away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledField {
    pub name: String,
    pub kind: FieldKind,
    pub template: NodeTemplate,
    pub default: FieldValue,
}

impl CompiledField {
    /// Read this field's value back out of an attribute entry, falling back
    /// to the default when the entry is missing or has the wrong shape.
    pub fn value_from_attr(&self, attr: Option<&Value>) -> FieldValue {
        let Some(attr) = attr else {
            return self.default.clone();
        };
        match self.kind {
            FieldKind::RichText => self.default.clone(),
            FieldKind::Text => attr
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .unwrap_or_else(|| self.default.clone()),
            FieldKind::Dropdown => attr
                .as_str()
                .map(|s| FieldValue::Dropdown(s.to_string()))
                .unwrap_or_else(|| self.default.clone()),
            FieldKind::Checkbox => attr
                .as_bool()
                .map(FieldValue::Checkbox)
                .unwrap_or_else(|| self.default.clone()),
            FieldKind::Custom => FieldValue::Custom(attr.clone()),
        }
    }
}

/// An element's compiled field spec: the lookup the assembler hands to the
/// runtime, keyed by element name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFieldSpec {
    pub element: String,
    fields: Vec<CompiledField>,
}

impl CompiledFieldSpec {
    pub(crate) fn new(element: String, fields: Vec<CompiledField>) -> Self {
        Self { element, fields }
    }

    pub fn get(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn rich_text_fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::RichText)
    }

    pub fn atomic_fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields
            .iter()
            .filter(|f| f.kind != FieldKind::RichText)
    }

    /// The parent node's content expression: the rich-text field names, in
    /// declaration order, space-joined. Empty when the element has none.
    pub fn content_expression(&self) -> String {
        self.rich_text_fields()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Default attributes of the parent node: the element type plus every
    /// atomic field's default value under `fields`.
    pub fn default_attrs(&self) -> Value {
        let mut fields = serde_json::Map::new();
        for field in self.atomic_fields() {
            fields.insert(field.name.clone(), field.default.as_attr());
        }
        json!({ "type": self.element, "fields": Value::Object(fields) })
    }

    /// The parent node template for this element.
    pub fn parent_template(&self) -> NodeTemplate {
        NodeTemplate::container(self.content_expression()).with_attrs(self.default_attrs())
    }
}
