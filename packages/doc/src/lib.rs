//! # Inlay Document Seam
//!
//! The minimal host-document model the rest of the workspace builds against:
//! a node tree with token-based positions, node templates and schemas, and
//! snapshot transactions.
//!
//! The host editor owns node identity and position. Everything here is
//! designed around that: positions are recomputed from the tree on demand,
//! transactions are applied in strict arrival order, and a transaction that
//! would not change the document reports `doc_changed() == false` so callers
//! can drop it before it pollutes undo history.

mod node;
mod schema;
mod state;
mod transaction;

pub use node::Node;
pub use schema::{
    base_fragment, ContentTerm, NodeTemplate, Repeat, Schema, SchemaError, SchemaFragment,
};
pub use state::EditorState;
pub use transaction::{Selection, Step, Transaction, TransactionError};
