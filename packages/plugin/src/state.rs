use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use inlay_doc::{EditorState, Node};
use inlay_spec::{values_from_element_node, FieldKind};
use inlay_validation::ErrorMap;

use crate::plugin::ElementPlugin;

/// CSS class carried by error decorations.
pub const ERROR_DECORATION_CLASS: &str = "ElementValidationError";

/// A visual marker over a document range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub class: String,
}

/// The plugin's view of one document state.
///
/// Recomputed in full on every transaction: per-element error maps, the
/// aggregate `has_errors` flag, and the decorations derived from them.
/// Consumers never observe a partially stale map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginState {
    /// Error map per element, keyed by the element node's position.
    pub element_errors: BTreeMap<usize, ErrorMap>,

    /// Whether any element currently fails validation.
    pub has_errors: bool,

    /// Error markers, one per failing field, in document order.
    pub decorations: Vec<Decoration>,
}

impl ElementPlugin {
    /// Recompute the plugin state for a document state.
    ///
    /// Walks every element node, reads its field values off the node, and
    /// runs the element's validator. Decorations are a pure function of the
    /// error maps: the same document always yields the same set.
    pub fn apply_state(&self, state: &EditorState) -> PluginState {
        let mut element_errors = BTreeMap::new();
        let mut decorations = Vec::new();

        state.doc().descendants(&mut |node, pos| {
            let Some(element) = self
                .elements
                .iter()
                .find(|e| e.compiled.element == node.type_name)
            else {
                return true;
            };

            let values = values_from_element_node(&element.compiled, node);
            let errors = element.validator.validate(&values);
            decorate(&element.compiled, node, pos, &errors, &mut decorations);
            element_errors.insert(pos, errors);
            false
        });

        let has_errors = element_errors
            .values()
            .flat_map(|errors| errors.values())
            .any(|failures| !failures.is_empty());

        PluginState {
            element_errors,
            has_errors,
            decorations,
        }
    }

    /// Whether any element in the document currently fails validation.
    pub fn has_errors(&self, state: &EditorState) -> bool {
        self.apply_state(state).has_errors
    }
}

/// Emit one decoration per failing field: rich-text failures mark the
/// field's child node, atomic failures mark the whole element.
fn decorate(
    compiled: &inlay_spec::CompiledFieldSpec,
    node: &Node,
    pos: usize,
    errors: &ErrorMap,
    decorations: &mut Vec<Decoration>,
) {
    for field in compiled.iter() {
        let failing = errors
            .get(&field.name)
            .map(|failures| !failures.is_empty())
            .unwrap_or(false);
        if !failing {
            continue;
        }
        let (from, to) = match field.kind {
            FieldKind::RichText => match node
                .content
                .iter()
                .position(|child| child.type_name == field.name)
            {
                Some(index) => {
                    let from = pos + 1 + node.child_offset(index);
                    (from, from + node.content[index].node_size())
                }
                None => (pos, pos + node.node_size()),
            },
            _ => (pos, pos + node.node_size()),
        };
        decorations.push(Decoration {
            from,
            to,
            class: ERROR_DECORATION_CLASS.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::build_element_plugin;
    use inlay_doc::{base_fragment, Schema, Selection};
    use inlay_spec::{
        element_node_from_values, ElementSpec, FieldDescription, FieldSpec, FieldValue,
        FieldValues,
    };
    use inlay_validation::{max_length, required};
    use serde_json::Value;

    fn plugin() -> ElementPlugin {
        build_element_plugin(
            vec![ElementSpec::new(
                "image",
                FieldSpec::new()
                    .field(
                        "caption",
                        FieldDescription::rich_text()
                            .with_validators(vec![required(), max_length(5)]),
                    )
                    .field("useSrc", FieldDescription::checkbox(false)),
            )],
            None,
        )
        .unwrap()
    }

    fn state_with_caption(plugin: &ElementPlugin, caption: &str) -> EditorState {
        let schema =
            Schema::build(vec![base_fragment(), plugin.schema_fragment().clone()]).unwrap();
        let element = element_node_from_values(
            &schema,
            plugin.element("image").unwrap(),
            &FieldValues::from_iter([(
                "caption".to_string(),
                FieldValue::RichText(caption.to_string()),
            )]),
        )
        .unwrap();
        let doc = Node::with_content("doc", Value::Null, vec![element]);
        EditorState::new(schema, doc, Selection::caret(0))
    }

    #[test]
    fn test_valid_document_has_no_errors() {
        let plugin = plugin();
        let state = state_with_caption(&plugin, "Boat");
        let plugin_state = plugin.apply_state(&state);

        assert!(!plugin_state.has_errors);
        assert!(plugin_state.decorations.is_empty());
        // The element's error map is still present, fully recomputed.
        assert_eq!(plugin_state.element_errors.len(), 1);
        assert!(plugin_state.element_errors[&0]["caption"].is_empty());
    }

    #[test]
    fn test_failing_field_sets_has_errors_and_decorations() {
        let plugin = plugin();
        let state = state_with_caption(&plugin, "");
        let plugin_state = plugin.apply_state(&state);

        assert!(plugin_state.has_errors);
        let errors = &plugin_state.element_errors[&0]["caption"];
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, "Required");

        // The caption child starts just past the element's opening token.
        assert_eq!(
            plugin_state.decorations,
            vec![Decoration {
                from: 1,
                to: 5,
                class: ERROR_DECORATION_CLASS.to_string(),
            }]
        );
    }

    #[test]
    fn test_decorations_are_deterministic() {
        let plugin = plugin();
        let state = state_with_caption(&plugin, "Far too long a caption");
        assert_eq!(
            plugin.apply_state(&state).decorations,
            plugin.apply_state(&state).decorations
        );
    }

    #[test]
    fn test_has_errors_follows_the_document() {
        let plugin = plugin();
        assert!(plugin.has_errors(&state_with_caption(&plugin, "")));
        assert!(!plugin.has_errors(&state_with_caption(&plugin, "Boat")));
    }
}
