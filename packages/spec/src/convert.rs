use std::collections::HashMap;

use serde_json::{Map, Value};

use inlay_doc::{Node, Schema};

use crate::compile::CompiledFieldSpec;
use crate::field::{FieldKind, FieldValue};

/// A flat mapping from field name to value, the shape validation and
/// insertion consume. Partial maps are fine: missing fields fall back to
/// their declared defaults.
pub type FieldValues = HashMap<String, FieldValue>;

/// Build the child nodes for an element's rich-text fields from a value map.
///
/// Atomic fields contribute nothing here; their values travel in the parent
/// node's attributes instead.
pub fn nodes_for_field_values(
    schema: &Schema,
    spec: &CompiledFieldSpec,
    values: &FieldValues,
) -> Option<Vec<Node>> {
    let mut nodes = Vec::new();
    for field in spec.rich_text_fields() {
        let text = values
            .get(&field.name)
            .and_then(FieldValue::as_plain_text)
            .unwrap_or("");
        nodes.push(rich_text_node(schema, &field.name, text)?);
    }
    Some(nodes)
}

fn rich_text_node(schema: &Schema, name: &str, text: &str) -> Option<Node> {
    let template = schema.node_type(name)?;
    let first_term = template.content_terms().next();
    let children = match first_term {
        Some(term) if term.name == "paragraph" => {
            let inner = if text.is_empty() {
                Vec::new()
            } else {
                vec![Node::text(text)]
            };
            vec![Node::with_content("paragraph", Value::Null, inner)]
        }
        Some(term) if term.name == "text" => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Node::text(text)]
            }
        }
        _ => Vec::new(),
    };
    schema.create_and_fill(name, None, children)
}

/// Build a filled element node from a value map.
///
/// Returns `None` when the schema cannot satisfy the element's content
/// expression with the built children.
pub fn element_node_from_values(
    schema: &Schema,
    spec: &CompiledFieldSpec,
    values: &FieldValues,
) -> Option<Node> {
    let mut fields = Map::new();
    for field in spec.atomic_fields() {
        let value = values.get(&field.name).cloned().unwrap_or_else(|| field.default.clone());
        fields.insert(field.name.clone(), value.as_attr());
    }
    let attrs = Value::Object(Map::from_iter([
        ("type".to_string(), Value::String(spec.element.clone())),
        ("fields".to_string(), Value::Object(fields)),
    ]));

    let children = nodes_for_field_values(schema, spec, values)?;
    schema.create_and_fill(&spec.element, Some(attrs), children)
}

/// Read every declared field's value back off an element node.
///
/// The result covers the whole field spec: rich-text values come from child
/// node content, atomic values from the parent's `fields` attribute, and
/// anything missing or malformed falls back to the field's default.
pub fn values_from_element_node(spec: &CompiledFieldSpec, node: &Node) -> FieldValues {
    let attr_fields = node.attrs.get("fields");
    let mut values = FieldValues::with_capacity(spec.len());
    for field in spec.iter() {
        let value = match field.kind {
            FieldKind::RichText => node
                .content
                .iter()
                .find(|child| child.type_name == field.name)
                .map(|child| FieldValue::RichText(child.text_content()))
                .unwrap_or_else(|| field.default.clone()),
            _ => field.value_from_attr(attr_fields.and_then(|f| f.get(&field.name))),
        };
        values.insert(field.name.clone(), value);
    }
    values
}
