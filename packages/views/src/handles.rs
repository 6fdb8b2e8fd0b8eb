use inlay_doc::{EditorState, Transaction};
use inlay_spec::{FieldKind, FieldValue};

use crate::element_view::write_element_fields;
use crate::errors::ViewError;

/// A renderer's window onto one field: the current value plus an update
/// entry point for atomic fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHandle {
    pub name: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    element: String,
    element_pos: usize,
}

impl FieldHandle {
    pub(crate) fn new(
        name: String,
        kind: FieldKind,
        value: FieldValue,
        element: String,
        element_pos: usize,
    ) -> Self {
        Self {
            name,
            kind,
            value,
            element,
            element_pos,
        }
    }

    /// Write a new value into the outer document. Rich-text fields are
    /// edited through the host's nested editing support, not through this
    /// handle.
    pub fn update(
        &self,
        value: &FieldValue,
        state: &EditorState,
    ) -> Result<Option<Transaction>, ViewError> {
        if self.kind == FieldKind::RichText {
            return Err(ViewError::NotAnAtomicField(self.name.clone()));
        }
        write_element_fields(state, &self.element, self.element_pos, &self.name, value)
    }
}

/// The handles for one element instance, one per declared field, in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHandles {
    element: String,
    element_pos: usize,
    entries: Vec<FieldHandle>,
}

impl FieldHandles {
    pub(crate) fn new(element: String, element_pos: usize, entries: Vec<FieldHandle>) -> Self {
        Self {
            element,
            element_pos,
            entries,
        }
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn element_pos(&self) -> usize {
        self.element_pos
    }

    pub fn get(&self, name: &str) -> Option<&FieldHandle> {
        self.entries.iter().find(|handle| handle.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldHandle> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
