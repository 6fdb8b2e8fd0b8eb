use crate::node::Node;
use crate::schema::Schema;
use crate::transaction::{Selection, Transaction};

/// A snapshot of the outer editor: schema, document and selection.
///
/// States are immutable. Applying a transaction produces the next state;
/// transactions are applied and observed in strict arrival order, and every
/// consumer of a state sees the document as of the most recently applied
/// transaction.
#[derive(Debug, Clone)]
pub struct EditorState {
    schema: Schema,
    doc: Node,
    selection: Selection,
}

impl EditorState {
    pub fn new(schema: Schema, doc: Node, selection: Selection) -> Self {
        Self {
            schema,
            doc,
            selection,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Start a transaction against this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(self)
    }

    /// Apply a transaction, producing the next state.
    pub fn apply(&self, tr: Transaction) -> EditorState {
        let selection = tr.selection();
        EditorState {
            schema: self.schema.clone(),
            doc: tr.doc().clone(),
            selection,
        }
    }

    /// Replace the selection without going through a transaction.
    pub fn with_selection(&self, selection: Selection) -> EditorState {
        EditorState {
            schema: self.schema.clone(),
            doc: self.doc.clone(),
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{base_fragment, Schema};
    use serde_json::{json, Value};

    #[test]
    fn test_apply_advances_doc_and_selection() {
        let schema = Schema::build(vec![base_fragment()]).unwrap();
        let doc = Node::with_content(
            "doc",
            Value::Null,
            vec![Node::leaf("marker", json!({ "fields": 1 }))],
        );
        let state = EditorState::new(schema, doc, Selection::caret(0));

        let mut tr = state.tr();
        tr.set_node_attrs(0, json!({ "fields": 2 })).unwrap();
        let next = state.apply(tr);

        assert_eq!(next.doc().node_at(0).unwrap().attrs, json!({ "fields": 2 }));
        // The original snapshot is untouched.
        assert_eq!(state.doc().node_at(0).unwrap().attrs, json!({ "fields": 1 }));
    }
}
