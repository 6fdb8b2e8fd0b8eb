//! # Inlay Node Views
//!
//! Keeps nested editable regions consistent with the outer document while
//! letting each field be edited as if it were a small independent editor.
//!
//! ## Update protocol
//!
//! The host applies a transaction, then calls [`ViewRegistry::sync`] with
//! the new state. The registry walks the element nodes in document order
//! and, for each one, either updates the existing view in place with the
//! new governing node and resolved position, or destroys it and creates a
//! fresh view when the node's type no longer matches. Views never survive
//! the transaction that removed their node.
//!
//! ## Outward writes
//!
//! A view never caches an absolute position across transactions: every
//! write re-resolves its target from the current state, verifies the
//! governing node's type (anything else is a stale view, an error for that
//! view only), and returns the built transaction only when it would
//! actually change the document. A no-op write returns `None` so undo
//! history never records it.

mod element_view;
mod errors;
mod field_view;
mod handles;
mod registry;

pub use element_view::ElementView;
pub use errors::ViewError;
pub use field_view::{AtomicView, CustomView, FieldView, RichTextView, SubscriberId, CONTENT_OFFSET};
pub use handles::{FieldHandle, FieldHandles};
pub use registry::{ElementRenderer, ViewRegistry};
