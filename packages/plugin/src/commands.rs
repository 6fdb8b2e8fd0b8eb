use inlay_doc::{EditorState, Node};

/// Decides which document nodes the query commands consider elements.
pub type Predicate = Box<dyn Fn(&Node) -> bool>;

/// The default predicate: any node whose type is one of the registered
/// element names.
pub(crate) fn default_predicate(names: Vec<String>) -> Predicate {
    Box::new(move |node: &Node| names.iter().any(|name| name == &node.type_name))
}

impl crate::plugin::ElementPlugin {
    /// Positions and type names of the predicate-matched element nodes, in
    /// document order.
    pub fn element_positions(&self, state: &EditorState) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        state.doc().descendants(&mut |node, pos| {
            if (self.predicate)(node) {
                found.push((pos, node.type_name.clone()));
                false
            } else {
                true
            }
        });
        found
    }

    /// Whether the current selection sits inside an element node.
    pub fn is_selection_inside_element(&self, state: &EditorState) -> bool {
        let selection = state.selection();
        self.element_positions(state)
            .iter()
            .any(|(pos, name)| {
                let size = state
                    .doc()
                    .node_at(*pos)
                    .filter(|node| &node.type_name == name)
                    .map(Node::node_size)
                    .unwrap_or(0);
                selection.from > *pos && selection.to < pos + size
            })
    }
}
