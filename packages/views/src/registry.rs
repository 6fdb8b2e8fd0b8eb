use std::collections::HashMap;

use inlay_doc::{EditorState, Node};
use inlay_spec::CompiledFieldSpec;

use crate::element_view::ElementView;
use crate::handles::FieldHandles;

/// Hook invoked with an element's field handles after the element's view is
/// created or updated. Opaque to the core; this is where a widget layer
/// plugs in.
pub trait ElementRenderer: std::fmt::Debug {
    fn render(&self, handles: &FieldHandles);
}

/// The set of live element views for one editor instance.
///
/// Entries are created when a governing node first appears, updated in
/// place while the node keeps its type, and destroyed in the same `sync`
/// pass that observes the node's removal or replacement. The pairing of
/// nodes to views is recomputed from the document on every transaction;
/// nothing in here is a long-lived pointer into the tree.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    elements: Vec<CompiledFieldSpec>,
    renderers: HashMap<String, Box<dyn ElementRenderer>>,
    views: Vec<ElementView>,
}

impl ViewRegistry {
    pub fn new(elements: Vec<CompiledFieldSpec>) -> Self {
        Self {
            elements,
            renderers: HashMap::new(),
            views: Vec::new(),
        }
    }

    /// Attach a renderer for one element kind.
    pub fn set_renderer(&mut self, element: impl Into<String>, renderer: Box<dyn ElementRenderer>) {
        self.renderers.insert(element.into(), renderer);
    }

    pub fn is_element(&self, type_name: &str) -> bool {
        self.elements.iter().any(|e| e.element == type_name)
    }

    pub fn views(&self) -> &[ElementView] {
        &self.views
    }

    pub fn view_at(&self, pos: usize) -> Option<&ElementView> {
        self.views.iter().find(|view| view.pos() == pos)
    }

    pub fn view_at_mut(&mut self, pos: usize) -> Option<&mut ElementView> {
        self.views.iter_mut().find(|view| view.pos() == pos)
    }

    /// Reconcile the live views with the document of the given state.
    ///
    /// Element nodes are walked in document order and paired with the
    /// surviving views in order: compatible views receive the new node and
    /// resolved position, incompatible ones are destroyed and replaced, and
    /// views whose nodes are gone are destroyed before this returns.
    pub fn sync(&mut self, state: &EditorState) {
        let mut found: Vec<(usize, Node)> = Vec::new();
        state.doc().descendants(&mut |node, pos| {
            if self.is_element(&node.type_name) {
                found.push((pos, node.clone()));
                // Elements do not nest inside each other's fields.
                false
            } else {
                true
            }
        });

        let old_views = std::mem::take(&mut self.views);
        let mut old_views = old_views.into_iter();
        let mut next_views = Vec::with_capacity(found.len());

        for (pos, node) in &found {
            match old_views.next() {
                Some(mut view) => {
                    if view.update(node, *pos) {
                        next_views.push(view);
                    } else {
                        view.destroy();
                        next_views.push(self.create_view(node, *pos));
                    }
                }
                None => next_views.push(self.create_view(node, *pos)),
            }
        }
        for mut leftover in old_views {
            leftover.destroy();
        }
        self.views = next_views;

        for view in &self.views {
            if let Some(renderer) = self.renderers.get(view.element_name()) {
                renderer.render(&view.handles());
            }
        }
    }

    fn create_view(&self, node: &Node, pos: usize) -> ElementView {
        let spec = self
            .elements
            .iter()
            .find(|e| e.element == node.type_name)
            .expect("only registered elements are collected")
            .clone();
        ElementView::new(spec, node, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use inlay_doc::{base_fragment, Schema, Selection};
    use inlay_spec::{
        assemble, element_node_from_values, Assembly, ElementSpec, FieldDescription, FieldSpec,
        FieldValue, FieldValues,
    };
    use serde_json::{json, Value};

    fn assembly() -> Assembly {
        assemble(&[
            ElementSpec::new(
                "image",
                FieldSpec::new()
                    .field("caption", FieldDescription::rich_text())
                    .field("useSrc", FieldDescription::checkbox(false)),
            ),
            ElementSpec::new(
                "note",
                FieldSpec::new().field("payload", FieldDescription::custom(Value::Null)),
            ),
        ])
        .unwrap()
    }

    fn state_with_elements(assembly: &Assembly, elements: Vec<Node>) -> EditorState {
        let schema = Schema::build(vec![base_fragment(), assembly.fragment.clone()]).unwrap();
        let mut content = vec![Node::with_content(
            "paragraph",
            Value::Null,
            vec![Node::text("ab")],
        )];
        content.extend(elements);
        let doc = Node::with_content("doc", Value::Null, content);
        EditorState::new(schema, doc, Selection::caret(0))
    }

    fn image_node(assembly: &Assembly, schema_state: &EditorState) -> Node {
        element_node_from_values(
            schema_state.schema(),
            assembly.element("image").unwrap(),
            &FieldValues::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_sync_creates_views_for_new_elements() {
        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let mut registry = ViewRegistry::new(assembly.elements.clone());

        registry.sync(&empty_state);
        assert!(registry.views().is_empty());

        let element = image_node(&assembly, &empty_state);
        let state = state_with_elements(&assembly, vec![element]);
        registry.sync(&state);

        assert_eq!(registry.views().len(), 1);
        let view = &registry.views()[0];
        assert_eq!(view.element_name(), "image");
        assert_eq!(view.pos(), 4);
    }

    #[test]
    fn test_sync_updates_positions_when_content_shifts() {
        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let element = image_node(&assembly, &empty_state);

        let state = state_with_elements(&assembly, vec![element.clone()]);
        let mut registry = ViewRegistry::new(assembly.elements.clone());
        registry.sync(&state);
        assert_eq!(registry.views()[0].pos(), 4);

        // Grow the leading paragraph: the element shifts right.
        let schema = state.schema().clone();
        let doc = Node::with_content(
            "doc",
            Value::Null,
            vec![
                Node::with_content("paragraph", Value::Null, vec![Node::text("abcd")]),
                element,
            ],
        );
        let shifted = EditorState::new(schema, doc, Selection::caret(0));
        registry.sync(&shifted);

        assert_eq!(registry.views().len(), 1);
        assert_eq!(registry.views()[0].pos(), 6);
    }

    #[test]
    fn test_sync_destroys_views_for_removed_elements() {
        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let element = image_node(&assembly, &empty_state);
        let state = state_with_elements(&assembly, vec![element]);

        let mut registry = ViewRegistry::new(assembly.elements.clone());
        registry.sync(&state);
        assert_eq!(registry.views().len(), 1);

        registry.sync(&empty_state);
        assert!(registry.views().is_empty());
    }

    #[test]
    fn test_sync_replaces_views_when_element_type_changes() {
        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let schema = empty_state.schema();

        let image = image_node(&assembly, &empty_state);
        let note = element_node_from_values(
            schema,
            assembly.element("note").unwrap(),
            &FieldValues::from_iter([(
                "payload".to_string(),
                FieldValue::Custom(json!({ "x": 1 })),
            )]),
        )
        .unwrap();

        let mut registry = ViewRegistry::new(assembly.elements.clone());
        registry.sync(&state_with_elements(&assembly, vec![image]));
        assert_eq!(registry.views()[0].element_name(), "image");

        // The image is replaced wholesale by a note at the same position.
        registry.sync(&state_with_elements(&assembly, vec![note]));
        assert_eq!(registry.views().len(), 1);
        assert_eq!(registry.views()[0].element_name(), "note");
    }

    #[test]
    fn test_destroyed_views_stop_notifying_subscribers() {
        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let schema = empty_state.schema();
        let note = element_node_from_values(
            schema,
            assembly.element("note").unwrap(),
            &FieldValues::from_iter([("payload".to_string(), FieldValue::Custom(json!(1)))]),
        )
        .unwrap();
        let state = state_with_elements(&assembly, vec![note.clone()]);

        let mut registry = ViewRegistry::new(assembly.elements.clone());
        registry.sync(&state);

        let seen = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&seen);
        let pos = registry.views()[0].pos();
        registry
            .view_at_mut(pos)
            .unwrap()
            .subscribe("payload", Box::new(move |_| *sink.borrow_mut() += 1))
            .unwrap();
        assert_eq!(*seen.borrow(), 1);

        // Element removed: view is destroyed during sync.
        registry.sync(&empty_state);

        // Element comes back with a different payload; the old subscriber
        // must not hear about it.
        let mut changed = note;
        changed.attrs["fields"]["payload"] = json!(2);
        registry.sync(&state_with_elements(&assembly, vec![changed]));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_renderer_runs_on_create_and_update() {
        #[derive(Debug)]
        struct Recorder(Rc<RefCell<Vec<FieldValue>>>);
        impl ElementRenderer for Recorder {
            fn render(&self, handles: &FieldHandles) {
                self.0
                    .borrow_mut()
                    .push(handles.get("useSrc").unwrap().value.clone());
            }
        }

        let assembly = assembly();
        let empty_state = state_with_elements(&assembly, vec![]);
        let mut element = image_node(&assembly, &empty_state);
        let state = state_with_elements(&assembly, vec![element.clone()]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ViewRegistry::new(assembly.elements.clone());
        registry.set_renderer("image", Box::new(Recorder(Rc::clone(&seen))));

        registry.sync(&state);
        element.attrs["fields"]["useSrc"] = json!(true);
        registry.sync(&state_with_elements(&assembly, vec![element]));

        assert_eq!(
            seen.borrow().as_slice(),
            &[FieldValue::Checkbox(false), FieldValue::Checkbox(true)]
        );
    }
}
