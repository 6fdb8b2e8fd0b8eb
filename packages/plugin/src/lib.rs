//! # Inlay Plugin
//!
//! The top of the stack: build a plugin from element specs and wire it into
//! a host editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ spec: field descriptions → templates + defaults │
//! └─────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────┐
//! │ plugin: state machine + commands                │
//! │  - assemble the schema fragment for the host    │
//! │  - recompute per-element errors per transaction │
//! │  - insert elements at the selection             │
//! │  - predicate-gated element queries              │
//! └─────────────────────────────────────────────────┘
//!             ↓                          ↓
//! ┌───────────────────────┐  ┌───────────────────────┐
//! │ validation: rules →   │  │ views: nested regions │
//! │ error maps            │  │ synced per transaction│
//! └───────────────────────┘  └───────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inlay_plugin::{build_element_plugin, ElementSpec, FieldDescription, FieldSpec};
//!
//! let plugin = build_element_plugin(
//!     vec![ElementSpec::new(
//!         "image",
//!         FieldSpec::new()
//!             .field("caption", FieldDescription::rich_text())
//!             .field("useSrc", FieldDescription::checkbox(false)),
//!     )],
//!     None,
//! )?;
//!
//! // Merge plugin.schema_fragment() into the host schema, then per
//! // transaction:
//! let state = state.apply(tr);
//! registry.sync(&state);
//! let plugin_state = plugin.apply_state(&state);
//! ```

mod commands;
mod plugin;
mod state;

pub use commands::Predicate;
pub use plugin::{build_element_plugin, ElementError, ElementPlugin};
pub use state::{Decoration, PluginState, ERROR_DECORATION_CLASS};

// Re-export the layers a host needs to drive the plugin.
pub use inlay_doc::{
    base_fragment, EditorState, Node, NodeTemplate, Schema, SchemaError, SchemaFragment,
    Selection, Transaction, TransactionError,
};
pub use inlay_spec::{
    assemble, CompiledField, CompiledFieldSpec, DropdownOption, ElementSpec, FieldDescription,
    FieldKind, FieldSpec, FieldValue, FieldValues, Rule, SpecError, ValidationError,
};
pub use inlay_validation::{
    create_validator, max_length, required, ElementValidator, ErrorMap, ValidationMap,
};
pub use inlay_views::{
    ElementRenderer, ElementView, FieldHandle, FieldHandles, SubscriberId, ViewError, ViewRegistry,
};
