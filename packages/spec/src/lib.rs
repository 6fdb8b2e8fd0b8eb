//! # Inlay Field & Element Specs
//!
//! The declarative layer: element authors describe their fields
//! ([`FieldDescription`], [`FieldSpec`]) and the compiler/assembler turn
//! those descriptions into the node templates and defaults the host schema
//! needs ([`assemble`]).
//!
//! A rich-text field compiles to a container node template; every other
//! field kind compiles to an atomic template whose value lives in node
//! attributes and never appears in a content expression.

mod assemble;
mod compile;
mod convert;
mod element;
mod field;
mod rule;

pub use assemble::{assemble, Assembly, SpecError};
pub use compile::{compile_field, CompiledField, CompiledFieldSpec};
pub use convert::{
    element_node_from_values, nodes_for_field_values, values_from_element_node, FieldValues,
};
pub use element::ElementSpec;
pub use field::{DropdownOption, FieldDescription, FieldKind, FieldOptions, FieldSpec, FieldValue};
pub use rule::{Rule, ValidationError};
