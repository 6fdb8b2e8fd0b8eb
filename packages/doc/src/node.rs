use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node in the outer document tree.
///
/// Positions follow the host editor's token model: a text node occupies one
/// position per character, any other leaf occupies exactly one position, and
/// a parent occupies its content plus an opening and a closing token. The
/// position of a node's first child is therefore the parent's position `+ 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Attribute object. Element nodes carry their atomic field values under
    /// the `fields` key.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attrs: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Leaf nodes with no editable content (atomic fields).
    #[serde(default)]
    pub atom: bool,
}

impl Node {
    /// Create a container node with the given children.
    pub fn with_content(type_name: impl Into<String>, attrs: Value, content: Vec<Node>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            content,
            text: None,
            atom: false,
        }
    }

    /// Create an atomic leaf node. Its state lives entirely in `attrs`.
    pub fn leaf(type_name: impl Into<String>, attrs: Value) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            content: Vec::new(),
            text: None,
            atom: true,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            type_name: "text".to_string(),
            attrs: Value::Null,
            content: Vec::new(),
            text: Some(text.into()),
            atom: false,
        }
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.atom || self.is_text()
    }

    /// Size of this node in positions, including its own tokens.
    pub fn node_size(&self) -> usize {
        if let Some(text) = &self.text {
            text.chars().count()
        } else if self.atom {
            1
        } else {
            self.content_size() + 2
        }
    }

    /// Combined size of this node's children.
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Offset of the child at `index` from the start of this node's content.
    pub fn child_offset(&self, index: usize) -> usize {
        self.content[..index].iter().map(Node::node_size).sum()
    }

    /// Resolve the node starting exactly at `pos`, where positions index into
    /// this node's content.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut cur = 0usize;
        for child in &self.content {
            if pos == cur {
                return Some(child);
            }
            let size = child.node_size();
            if pos < cur + size {
                // The position is inside this child, past its opening token.
                return child.node_at(pos - cur - 1);
            }
            cur += size;
        }
        None
    }

    /// Mutable variant of [`Node::node_at`].
    pub fn node_at_mut(&mut self, pos: usize) -> Option<&mut Node> {
        let mut cur = 0usize;
        for child in &mut self.content {
            if pos == cur {
                return Some(child);
            }
            let size = child.node_size();
            if pos < cur + size {
                return child.node_at_mut(pos - cur - 1);
            }
            cur += size;
        }
        None
    }

    /// Visit every descendant with its absolute position. Return `false` from
    /// the visitor to skip a node's children.
    pub fn descendants<F>(&self, visit: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.walk(0, visit);
    }

    fn walk<F>(&self, start: usize, visit: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut cur = start;
        for child in &self.content {
            if visit(child, cur) {
                child.walk(cur + 1, visit);
            }
            cur += child.node_size();
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}
