use thiserror::Error;

use inlay_doc::{SchemaError, SchemaFragment};

use crate::compile::{compile_field, CompiledField, CompiledFieldSpec};
use crate::element::ElementSpec;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    #[error("Duplicate field {field} in element {element}")]
    DuplicateField { element: String, field: String },

    #[error("Node type {name} is already registered; element and field names must be unique across the plugin")]
    DuplicateNodeType { name: String },
}

impl From<SchemaError> for SpecError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::DuplicateNodeType(name) | SchemaError::UnknownNodeType(name) => {
                SpecError::DuplicateNodeType { name }
            }
        }
    }
}

/// The assembler's output: one merged schema fragment for the host, plus the
/// compiled field spec of every element, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub fragment: SchemaFragment,
    pub elements: Vec<CompiledFieldSpec>,
}

impl Assembly {
    pub fn element(&self, name: &str) -> Option<&CompiledFieldSpec> {
        self.elements.iter().find(|e| e.element == name)
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.element.as_str())
    }
}

/// Merge the given element specs into one schema fragment.
///
/// For each element, the parent node template is registered under the
/// element's name with a content expression listing its rich-text fields in
/// declaration order, followed by every field's own compiled template under
/// the field's name. A name registered twice, whether by one element or by
/// two, is a configuration error: collisions are never silently resolved.
///
/// The fragment's iteration order follows the input order of elements and
/// their fields, so host schema snapshots are deterministic.
pub fn assemble(specs: &[ElementSpec]) -> Result<Assembly, SpecError> {
    let mut fragment = SchemaFragment::new();
    let mut elements = Vec::with_capacity(specs.len());

    for spec in specs {
        let mut compiled_fields = Vec::with_capacity(spec.fields.len());
        for (name, description) in spec.fields.iter() {
            if compiled_fields.iter().any(|f: &CompiledField| f.name == name) {
                return Err(SpecError::DuplicateField {
                    element: spec.name.clone(),
                    field: name.to_string(),
                });
            }
            let (template, default) = compile_field(description);
            compiled_fields.push(CompiledField {
                name: name.to_string(),
                kind: description.kind(),
                template,
                default,
            });
        }

        let compiled = CompiledFieldSpec::new(spec.name.clone(), compiled_fields);
        fragment.insert(spec.name.clone(), compiled.parent_template())?;
        for field in compiled.iter() {
            fragment.insert(field.name.clone(), field.template.clone())?;
        }
        elements.push(compiled);
    }

    Ok(Assembly { fragment, elements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDescription, FieldSpec};
    use serde_json::json;

    #[test]
    fn test_empty_spec_list_assembles_to_empty_fragment() {
        let assembly = assemble(&[]).unwrap();
        assert!(assembly.fragment.is_empty());
        assert!(assembly.elements.is_empty());
    }

    #[test]
    fn test_element_without_rich_text_has_empty_content() {
        let specs = vec![ElementSpec::new(
            "marker",
            FieldSpec::new().field("done", FieldDescription::checkbox(false)),
        )];
        let assembly = assemble(&specs).unwrap();
        assert_eq!(assembly.fragment.get("marker").unwrap().content, "");
    }

    #[test]
    fn test_content_expression_lists_rich_text_fields_in_order() {
        let specs = vec![ElementSpec::new(
            "image",
            FieldSpec::new()
                .field("caption", FieldDescription::rich_text())
                .field("useSrc", FieldDescription::checkbox(false))
                .field("altText", FieldDescription::rich_text()),
        )];
        let assembly = assemble(&specs).unwrap();

        let parent = assembly.fragment.get("image").unwrap();
        assert_eq!(parent.content, "caption altText");
        // Each rich-text field's template is present, keyed by field name.
        assert_eq!(assembly.fragment.get("caption").unwrap().content, "paragraph");
        assert_eq!(assembly.fragment.get("altText").unwrap().content, "paragraph");
        // Atomic fields are registered too but never appear in the content
        // expression.
        assert!(assembly.fragment.get("useSrc").unwrap().atom);
    }

    #[test]
    fn test_fragment_order_follows_declaration_order() {
        let specs = vec![
            ElementSpec::new(
                "image",
                FieldSpec::new().field("caption", FieldDescription::rich_text()),
            ),
            ElementSpec::new(
                "pullquote",
                FieldSpec::new().field("quote", FieldDescription::rich_text()),
            ),
        ];
        let assembly = assemble(&specs).unwrap();
        let names: Vec<_> = assembly.fragment.names().collect();
        assert_eq!(names, vec!["image", "caption", "pullquote", "quote"]);
    }

    #[test]
    fn test_parent_attrs_carry_atomic_defaults() {
        let specs = vec![ElementSpec::new(
            "embed",
            FieldSpec::new()
                .field("html", FieldDescription::text())
                .field("isMandatory", FieldDescription::checkbox(true)),
        )];
        let assembly = assemble(&specs).unwrap();
        assert_eq!(
            assembly.fragment.get("embed").unwrap().attrs,
            json!({ "type": "embed", "fields": { "html": "", "isMandatory": true } })
        );
    }

    #[test]
    fn test_duplicate_field_within_element_is_a_configuration_error() {
        let specs = vec![ElementSpec::new(
            "image",
            FieldSpec::new()
                .field("caption", FieldDescription::rich_text())
                .field("caption", FieldDescription::text()),
        )];
        let err = assemble(&specs).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateField {
                element: "image".to_string(),
                field: "caption".to_string(),
            }
        );
    }

    #[test]
    fn test_cross_element_collision_is_a_configuration_error() {
        let specs = vec![
            ElementSpec::new(
                "image",
                FieldSpec::new().field("caption", FieldDescription::rich_text()),
            ),
            ElementSpec::new(
                "figure",
                FieldSpec::new().field("caption", FieldDescription::rich_text()),
            ),
        ];
        let err = assemble(&specs).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateNodeType {
                name: "caption".to_string(),
            }
        );
    }

    #[test]
    fn test_element_lookup_by_name() {
        let specs = vec![ElementSpec::new(
            "image",
            FieldSpec::new().field("caption", FieldDescription::rich_text()),
        )];
        let assembly = assemble(&specs).unwrap();
        assert!(assembly.element("image").is_some());
        assert!(assembly.element("video").is_none());
    }
}
