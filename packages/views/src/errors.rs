use thiserror::Error;

use inlay_doc::TransactionError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("No node at position {0}")]
    NoNodeAtPosition(usize),

    /// The node at the view's position no longer has the expected type. The
    /// view must be destroyed and recreated, never reused.
    #[error("Stale view: expected a {expected} node, found {found}")]
    StaleView { expected: String, found: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{0} is not an atomic field")]
    NotAnAtomicField(String),

    #[error("{0} is not a custom field")]
    NotACustomField(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
