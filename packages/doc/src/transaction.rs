use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::node::Node;
use crate::state::EditorState;

/// A range in the outer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("No node at position {0}")]
    NoNodeAtPosition(usize),

    #[error("Selection {from}..{to} does not sit on top-level node boundaries")]
    SelectionNotAtBoundary { from: usize, to: usize },
}

/// One primitive document change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step")]
pub enum Step {
    /// Replace the attribute object of the node at `pos`.
    SetNodeAttrs { pos: usize, attrs: Value },

    /// Replace the current selection with a node.
    ReplaceSelectionWith { node: Node },
}

/// An atomic group of document changes, built against a state snapshot.
///
/// Steps apply eagerly to a working copy of the document. `doc_changed`
/// reports whether the document actually differs from the snapshot: a
/// `SetNodeAttrs` whose attributes deep-equal the current ones records a
/// step but changes nothing, and callers are expected to drop transactions
/// where `doc_changed()` is false rather than dispatch them.
#[derive(Debug, Clone)]
pub struct Transaction {
    doc: Node,
    selection: Selection,
    steps: Vec<Step>,
    doc_changed: bool,
}

impl Transaction {
    pub fn new(state: &EditorState) -> Self {
        Self {
            doc: state.doc().clone(),
            selection: state.selection(),
            steps: Vec::new(),
            doc_changed: false,
        }
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn doc_changed(&self) -> bool {
        self.doc_changed
    }

    /// Replace the attributes of the node at `pos`.
    pub fn set_node_attrs(
        &mut self,
        pos: usize,
        attrs: Value,
    ) -> Result<&mut Self, TransactionError> {
        let node = self
            .doc
            .node_at_mut(pos)
            .ok_or(TransactionError::NoNodeAtPosition(pos))?;
        if node.attrs != attrs {
            node.attrs = attrs.clone();
            self.doc_changed = true;
        }
        self.steps.push(Step::SetNodeAttrs { pos, attrs });
        Ok(self)
    }

    /// Replace the selected top-level nodes with `node`, leaving a caret
    /// after it. The selection must sit on top-level node boundaries.
    pub fn replace_selection_with(&mut self, node: Node) -> Result<&mut Self, TransactionError> {
        let Selection { from, to } = self.selection;
        let start = self.top_level_index(from)?;
        let end = self.top_level_index(to)?;

        let inserted_size = node.node_size();
        self.steps.push(Step::ReplaceSelectionWith { node: node.clone() });
        self.doc.content.splice(start..end, [node]);
        self.selection = Selection::caret(from + inserted_size);
        self.doc_changed = true;
        Ok(self)
    }

    /// Index of the top-level child starting at `pos`, or the child count
    /// when `pos` is the end of the document.
    fn top_level_index(&self, pos: usize) -> Result<usize, TransactionError> {
        let mut cur = 0usize;
        for (index, child) in self.doc.content.iter().enumerate() {
            if pos == cur {
                return Ok(index);
            }
            cur += child.node_size();
        }
        if pos == cur {
            return Ok(self.doc.content.len());
        }
        Err(TransactionError::SelectionNotAtBoundary {
            from: self.selection.from,
            to: self.selection.to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{base_fragment, Schema};
    use serde_json::json;

    fn state_with(doc: Node, selection: Selection) -> EditorState {
        let schema = Schema::build(vec![base_fragment()]).unwrap();
        EditorState::new(schema, doc, selection)
    }

    fn doc_with_leaf() -> Node {
        Node::with_content(
            "doc",
            Value::Null,
            vec![
                Node::with_content("paragraph", Value::Null, vec![Node::text("ab")]),
                Node::leaf("marker", json!({ "fields": { "done": false } })),
            ],
        )
    }

    #[test]
    fn test_set_node_attrs_changes_doc() {
        let state = state_with(doc_with_leaf(), Selection::caret(0));
        let mut tr = Transaction::new(&state);
        tr.set_node_attrs(4, json!({ "fields": { "done": true } }))
            .unwrap();
        assert!(tr.doc_changed());
        assert_eq!(
            tr.doc().node_at(4).unwrap().attrs,
            json!({ "fields": { "done": true } })
        );
    }

    #[test]
    fn test_set_node_attrs_noop_does_not_change_doc() {
        let state = state_with(doc_with_leaf(), Selection::caret(0));
        let mut tr = Transaction::new(&state);
        tr.set_node_attrs(4, json!({ "fields": { "done": false } }))
            .unwrap();
        assert!(!tr.doc_changed());
        assert_eq!(tr.steps().len(), 1);
    }

    #[test]
    fn test_set_node_attrs_out_of_range() {
        let state = state_with(doc_with_leaf(), Selection::caret(0));
        let mut tr = Transaction::new(&state);
        let err = tr.set_node_attrs(99, json!({})).unwrap_err();
        assert_eq!(err, TransactionError::NoNodeAtPosition(99));
    }

    #[test]
    fn test_replace_selection_inserts_at_caret() {
        // Caret between the paragraph and the leaf.
        let state = state_with(doc_with_leaf(), Selection::caret(4));
        let mut tr = Transaction::new(&state);
        tr.replace_selection_with(Node::with_content("paragraph", Value::Null, vec![]))
            .unwrap();
        assert!(tr.doc_changed());
        assert_eq!(tr.doc().content.len(), 3);
        assert_eq!(tr.doc().content[1].type_name, "paragraph");
        // Caret lands after the inserted node.
        assert_eq!(tr.selection(), Selection::caret(6));
    }

    #[test]
    fn test_replace_selection_replaces_covered_nodes() {
        // Select the first paragraph (0..4) entirely.
        let state = state_with(doc_with_leaf(), Selection::new(0, 4));
        let mut tr = Transaction::new(&state);
        tr.replace_selection_with(Node::leaf("marker", Value::Null))
            .unwrap();
        assert_eq!(tr.doc().content.len(), 2);
        assert_eq!(tr.doc().content[0].type_name, "marker");
    }

    #[test]
    fn test_replace_selection_rejects_mid_node_positions() {
        let state = state_with(doc_with_leaf(), Selection::caret(2));
        let mut tr = Transaction::new(&state);
        let err = tr
            .replace_selection_with(Node::leaf("marker", Value::Null))
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::SelectionNotAtBoundary { .. }
        ));
    }
}
