use serde_json::{json, Value};
use tracing::warn;

use inlay_doc::{EditorState, Node, Transaction};
use inlay_spec::{CompiledFieldSpec, FieldKind, FieldValue};

use crate::errors::ViewError;
use crate::field_view::{FieldView, SubscriberId};
use crate::handles::{FieldHandle, FieldHandles};

/// The live view of one element instance: one [`FieldView`] per declared
/// field, plus the element's governing node and its last resolved position.
///
/// The position is refreshed by the registry on every transaction; between
/// refreshes it is only ever used as a starting point for re-resolution,
/// never trusted blindly.
#[derive(Debug)]
pub struct ElementView {
    spec: CompiledFieldSpec,
    node: Node,
    pos: usize,
    fields: Vec<FieldView>,
}

impl ElementView {
    pub fn new(spec: CompiledFieldSpec, node: &Node, pos: usize) -> Self {
        let fields = spec.iter().map(|field| FieldView::build(field, node)).collect();
        Self {
            spec,
            node: node.clone(),
            pos,
            fields,
        }
    }

    pub fn element_name(&self) -> &str {
        &self.spec.element
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn field_views(&self) -> &[FieldView] {
        &self.fields
    }

    /// Receive the new governing node and its newly resolved position.
    ///
    /// Returns `false` when the node's type no longer matches this view:
    /// the caller must destroy the view and build a fresh one, never reuse
    /// it.
    pub fn update(&mut self, node: &Node, pos: usize) -> bool {
        if node.type_name != self.spec.element {
            return false;
        }
        self.pos = pos;
        self.node = node.clone();
        for view in &mut self.fields {
            let field = self
                .spec
                .get(view.name())
                .expect("views are built from the spec");
            view.update(field, node);
        }
        true
    }

    /// Tear the view down, dropping every custom field's subscribers.
    pub fn destroy(&mut self) {
        for view in &mut self.fields {
            view.destroy();
        }
    }

    /// Write a new value for an atomic field into the outer document.
    ///
    /// The target position is re-resolved against the given state and the
    /// governing node's type is verified; a type mismatch is a stale view,
    /// not a silent success. Returns `None` when the write would not change
    /// the document.
    pub fn write_field(
        &self,
        field: &str,
        value: &FieldValue,
        state: &EditorState,
    ) -> Result<Option<Transaction>, ViewError> {
        let compiled = self
            .spec
            .get(field)
            .ok_or_else(|| ViewError::UnknownField(field.to_string()))?;
        if compiled.kind == FieldKind::RichText {
            return Err(ViewError::NotAnAtomicField(field.to_string()));
        }
        write_element_fields(state, &self.spec.element, self.pos, field, value)
    }

    /// Subscribe to a custom field's value.
    pub fn subscribe(
        &mut self,
        field: &str,
        notify: Box<dyn FnMut(&FieldValue)>,
    ) -> Result<SubscriberId, ViewError> {
        match self.custom_view_mut(field)? {
            FieldView::Custom(custom) => Ok(custom.subscribe(notify)),
            _ => unreachable!("custom_view_mut returns custom views only"),
        }
    }

    /// Unsubscribe from a custom field. Unknown subscriber ids are reported
    /// by the view and otherwise ignored.
    pub fn unsubscribe(&mut self, field: &str, id: SubscriberId) -> Result<(), ViewError> {
        match self.custom_view_mut(field)? {
            FieldView::Custom(custom) => {
                custom.unsubscribe(id);
                Ok(())
            }
            _ => unreachable!("custom_view_mut returns custom views only"),
        }
    }

    fn custom_view_mut(&mut self, field: &str) -> Result<&mut FieldView, ViewError> {
        let view = self
            .fields
            .iter_mut()
            .find(|view| view.name() == field)
            .ok_or_else(|| ViewError::UnknownField(field.to_string()))?;
        match view {
            FieldView::Custom(_) => Ok(view),
            _ => Err(ViewError::NotACustomField(field.to_string())),
        }
    }

    /// One handle per declared field, derived mechanically from the field
    /// spec: no extra, no missing.
    pub fn handles(&self) -> FieldHandles {
        let entries = self
            .spec
            .iter()
            .map(|field| {
                let value = match field.kind {
                    FieldKind::RichText => self
                        .node
                        .content
                        .iter()
                        .find(|child| child.type_name == field.name)
                        .map(|child| FieldValue::RichText(child.text_content()))
                        .unwrap_or_else(|| field.default.clone()),
                    _ => self
                        .fields
                        .iter()
                        .find(|view| view.name() == field.name)
                        .and_then(|view| view.cached_value().cloned())
                        .unwrap_or_else(|| field.default.clone()),
                };
                FieldHandle::new(
                    field.name.clone(),
                    field.kind,
                    value,
                    self.spec.element.clone(),
                    self.pos,
                )
            })
            .collect();
        FieldHandles::new(self.spec.element.clone(), self.pos, entries)
    }
}

/// Merge one field's value into the `fields` attribute of the element node
/// at `pos` and return the resulting transaction, or `None` when the
/// document would not change.
pub(crate) fn write_element_fields(
    state: &EditorState,
    element: &str,
    pos: usize,
    field: &str,
    value: &FieldValue,
) -> Result<Option<Transaction>, ViewError> {
    let node = state
        .doc()
        .node_at(pos)
        .ok_or(ViewError::NoNodeAtPosition(pos))?;
    if node.type_name != element {
        warn!(
            expected = element,
            found = %node.type_name,
            "stale view: governing node changed type, aborting write"
        );
        return Err(ViewError::StaleView {
            expected: element.to_string(),
            found: node.type_name.clone(),
        });
    }

    let mut attrs = if node.attrs.is_object() {
        node.attrs.clone()
    } else {
        json!({})
    };
    let obj = attrs.as_object_mut().expect("checked object");
    let fields = obj
        .entry("fields".to_string())
        .or_insert_with(|| json!({}));
    if !fields.is_object() {
        *fields = json!({});
    }
    fields
        .as_object_mut()
        .expect("checked object")
        .insert(field.to_string(), value.as_attr());

    let mut tr = state.tr();
    tr.set_node_attrs(pos, attrs)?;
    Ok(if tr.doc_changed() { Some(tr) } else { None })
}
