use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::node::Node;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Node type already registered: {0}")]
    DuplicateNodeType(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
}

/// Template for one node type: the schema fragment entry a host merges into
/// its own schema.
///
/// `to_dom` and `parse_dom` are opaque serialization hooks. The core never
/// interprets them; they are carried through so the host can round-trip
/// nodes to its serialized representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Space-joined ordered list of child node-type names. Empty for leaves.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub atom: bool,

    /// Default attributes for nodes of this type.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attrs: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_dom: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_dom: Option<Value>,
}

impl NodeTemplate {
    pub fn container(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            atom: false,
            attrs: Value::Null,
            to_dom: None,
            parse_dom: None,
        }
    }

    pub fn atom(attrs: Value) -> Self {
        Self {
            content: String::new(),
            atom: true,
            attrs,
            to_dom: None,
            parse_dom: None,
        }
    }

    pub fn with_attrs(mut self, attrs: Value) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_to_dom(mut self, to_dom: Value) -> Self {
        self.to_dom = Some(to_dom);
        self
    }

    pub fn with_parse_dom(mut self, parse_dom: Value) -> Self {
        self.parse_dom = Some(parse_dom);
        self
    }

    pub fn content_terms(&self) -> impl Iterator<Item = ContentTerm<'_>> {
        self.content.split_whitespace().map(ContentTerm::parse)
    }
}

/// One term of a content expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTerm<'a> {
    pub name: &'a str,
    pub repeat: Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    One,
    OnePlus,
    ZeroPlus,
}

impl<'a> ContentTerm<'a> {
    fn parse(token: &'a str) -> Self {
        if let Some(name) = token.strip_suffix('+') {
            Self {
                name,
                repeat: Repeat::OnePlus,
            }
        } else if let Some(name) = token.strip_suffix('*') {
            Self {
                name,
                repeat: Repeat::ZeroPlus,
            }
        } else if token == "text" {
            // Bare text is always optional: containers may be empty.
            Self {
                name: token,
                repeat: Repeat::ZeroPlus,
            }
        } else {
            Self {
                name: token,
                repeat: Repeat::One,
            }
        }
    }
}

/// An order-stable mapping from node-type name to template.
///
/// Iteration order is insertion order, so a host merging this fragment gets
/// a deterministic, diffable schema snapshot. Registering the same name
/// twice is a configuration error, never a silent overwrite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaFragment {
    entries: Vec<(String, NodeTemplate)>,
}

impl SchemaFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        template: NodeTemplate,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SchemaError::DuplicateNodeType(name));
        }
        self.entries.push((name, template));
        Ok(())
    }

    /// Append another fragment, preserving order. Fails on the first name
    /// collision.
    pub fn append(&mut self, other: SchemaFragment) -> Result<(), SchemaError> {
        for (name, template) in other.entries {
            self.insert(name, template)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodeTemplate> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeTemplate)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The base node templates a host document starts from.
pub fn base_fragment() -> SchemaFragment {
    let mut fragment = SchemaFragment::new();
    fragment
        .insert("doc", NodeTemplate::container("paragraph+"))
        .expect("empty fragment");
    fragment
        .insert("paragraph", NodeTemplate::container("text"))
        .expect("fresh name");
    fragment
        .insert("text", NodeTemplate::container(""))
        .expect("fresh name");
    fragment
}

/// A fully built document schema.
///
/// Built once from base templates plus plugin fragments. There is no way to
/// merge further fragments into an existing schema: merging after editor
/// initialization is unsupported, and the absence of a mutation API is how
/// that is enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    entries: Vec<(String, NodeTemplate)>,
}

impl Schema {
    /// Merge the given fragments, in order, into a schema. A node-type name
    /// registered by more than one fragment is a configuration error.
    pub fn build(fragments: Vec<SchemaFragment>) -> Result<Self, SchemaError> {
        let mut merged = SchemaFragment::new();
        for fragment in fragments {
            merged.append(fragment)?;
        }
        Ok(Self {
            entries: merged.entries,
        })
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeTemplate> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Build a node of the given type with default attributes and content.
    pub fn default_node(&self, name: &str) -> Option<Node> {
        let template = self.node_type(name)?;
        if name == "text" {
            return Some(Node::text(""));
        }
        if template.atom {
            return Some(Node::leaf(name, template.attrs.clone()));
        }
        let mut content = Vec::new();
        for term in template.content_terms() {
            match term.repeat {
                Repeat::ZeroPlus => {}
                Repeat::One | Repeat::OnePlus => content.push(self.default_node(term.name)?),
            }
        }
        Some(Node::with_content(name, template.attrs.clone(), content))
    }

    /// Build a node of the given type around the supplied children, filling
    /// any gaps in the content expression with default nodes.
    ///
    /// Returns `None` when the children cannot satisfy the expression, e.g. a
    /// child of a type the expression does not mention, or children out of
    /// order.
    pub fn create_and_fill(
        &self,
        name: &str,
        attrs: Option<Value>,
        children: Vec<Node>,
    ) -> Option<Node> {
        let template = self.node_type(name)?;
        let attrs = attrs.unwrap_or_else(|| template.attrs.clone());

        if template.atom {
            if !children.is_empty() {
                return None;
            }
            return Some(Node::leaf(name, attrs));
        }

        let mut supplied = children.into_iter().peekable();
        let mut filled = Vec::new();
        for term in template.content_terms() {
            match term.repeat {
                Repeat::One => {
                    if supplied.peek().map(|n| n.type_name == term.name) == Some(true) {
                        filled.push(supplied.next().expect("peeked"));
                    } else {
                        filled.push(self.default_node(term.name)?);
                    }
                }
                Repeat::OnePlus => {
                    let mut matched = 0usize;
                    while supplied.peek().map(|n| n.type_name == term.name) == Some(true) {
                        filled.push(supplied.next().expect("peeked"));
                        matched += 1;
                    }
                    if matched == 0 {
                        filled.push(self.default_node(term.name)?);
                    }
                }
                Repeat::ZeroPlus => {
                    while supplied.peek().map(|n| n.type_name == term.name) == Some(true) {
                        filled.push(supplied.next().expect("peeked"));
                    }
                }
            }
        }

        // Children left over after the expression is satisfied do not fit.
        if supplied.next().is_some() {
            return None;
        }

        Some(Node::with_content(name, attrs, filled))
    }
}
