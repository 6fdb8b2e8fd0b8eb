use std::fmt;

use tracing::error;

use inlay_doc::Node;
use inlay_spec::{CompiledField, FieldKind, FieldValue};

/// Offset accounting for the parent node's opening token: the first child
/// of a node at position `p` starts at `p + 1`.
pub const CONTENT_OFFSET: usize = 1;

/// Handle returned by [`FieldView::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

struct Subscriber {
    id: SubscriberId,
    notify: Box<dyn FnMut(&FieldValue)>,
}

/// A nested view bound to one field of one element instance.
///
/// The variant is chosen once, at construction, from the field's kind:
/// rich-text fields delegate content editing to the host and only track
/// where their child node sits; every other kind caches the field's value
/// locally, seeded from the governing node's attributes. The cache is
/// disposable: it is rebuilt from the node on every update and is never a
/// source of truth.
pub enum FieldView {
    RichText(RichTextView),
    Atomic(AtomicView),
    Custom(CustomView),
}

pub struct RichTextView {
    name: String,
    offset: usize,
}

pub struct AtomicView {
    name: String,
    value: FieldValue,
}

pub struct CustomView {
    name: String,
    value: FieldValue,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl FieldView {
    pub fn build(field: &CompiledField, element: &Node) -> FieldView {
        match field.kind {
            FieldKind::RichText => FieldView::RichText(RichTextView {
                offset: rich_text_offset(element, &field.name).unwrap_or(0),
                name: field.name.clone(),
            }),
            FieldKind::Custom => FieldView::Custom(CustomView {
                value: seed_value(field, element),
                name: field.name.clone(),
                subscribers: Vec::new(),
                next_id: 0,
            }),
            FieldKind::Text | FieldKind::Checkbox | FieldKind::Dropdown => {
                FieldView::Atomic(AtomicView {
                    value: seed_value(field, element),
                    name: field.name.clone(),
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldView::RichText(v) => &v.name,
            FieldView::Atomic(v) => &v.name,
            FieldView::Custom(v) => &v.name,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldView::RichText(_) => FieldKind::RichText,
            FieldView::Atomic(v) => v.value.kind(),
            FieldView::Custom(_) => FieldKind::Custom,
        }
    }

    /// The locally cached value, for views that keep one.
    pub fn cached_value(&self) -> Option<&FieldValue> {
        match self {
            FieldView::RichText(_) => None,
            FieldView::Atomic(v) => Some(&v.value),
            FieldView::Custom(v) => Some(&v.value),
        }
    }

    /// Absolute position of this field's child node, given the parent
    /// element's resolved position. Recomputed from scratch on every call;
    /// prior edits elsewhere in the document shift absolute positions, so
    /// nothing here may be cached across transactions.
    pub fn resolved_pos(&self, parent_pos: usize) -> Option<usize> {
        match self {
            FieldView::RichText(v) => Some(parent_pos + v.offset + CONTENT_OFFSET),
            _ => None,
        }
    }

    /// Refresh this view from the new governing node.
    pub fn update(&mut self, field: &CompiledField, element: &Node) {
        match self {
            FieldView::RichText(v) => {
                v.offset = rich_text_offset(element, &v.name).unwrap_or(v.offset);
            }
            FieldView::Atomic(v) => {
                v.value = seed_value(field, element);
            }
            FieldView::Custom(v) => {
                let value = seed_value(field, element);
                if value != v.value {
                    v.value = value;
                    v.notify_subscribers();
                }
            }
        }
    }

    /// Drop all subscribers. Called when the governing node is removed or
    /// replaced.
    pub fn destroy(&mut self) {
        if let FieldView::Custom(v) = self {
            v.subscribers.clear();
        }
    }
}

fn seed_value(field: &CompiledField, element: &Node) -> FieldValue {
    field.value_from_attr(
        element
            .attrs
            .get("fields")
            .and_then(|fields| fields.get(&field.name)),
    )
}

fn rich_text_offset(element: &Node, name: &str) -> Option<usize> {
    element
        .content
        .iter()
        .position(|child| child.type_name == name)
        .map(|index| element.child_offset(index))
}

impl CustomView {
    /// Register a subscriber. It is invoked immediately with the current
    /// value, and again on every subsequent value change until it is
    /// unsubscribed or the view is destroyed.
    pub fn subscribe(&mut self, notify: Box<dyn FnMut(&FieldValue)>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        let mut subscriber = Subscriber { id, notify };
        (subscriber.notify)(&self.value);
        self.subscribers.push(subscriber);
        id
    }

    /// Remove a subscriber. An unknown id is a consumer bug, not a document
    /// problem: it is reported and otherwise ignored.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                self.subscribers.remove(index);
            }
            None => {
                error!(
                    field = %self.name,
                    "attempted to unsubscribe an unknown subscriber from a custom field view"
                );
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify_subscribers(&mut self) {
        for subscriber in &mut self.subscribers {
            (subscriber.notify)(&self.value);
        }
    }
}

impl fmt::Debug for FieldView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldView::RichText(v) => f
                .debug_struct("RichTextView")
                .field("name", &v.name)
                .field("offset", &v.offset)
                .finish(),
            FieldView::Atomic(v) => f
                .debug_struct("AtomicView")
                .field("name", &v.name)
                .field("value", &v.value)
                .finish(),
            FieldView::Custom(v) => f
                .debug_struct("CustomView")
                .field("name", &v.name)
                .field("value", &v.value)
                .field("subscribers", &v.subscribers.len())
                .finish(),
        }
    }
}
