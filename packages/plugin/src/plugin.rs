use thiserror::Error;
use tracing::warn;

use inlay_doc::{EditorState, SchemaFragment, Transaction, TransactionError};
use inlay_spec::{
    assemble, element_node_from_values, CompiledFieldSpec, ElementSpec, FieldValues, SpecError,
};
use inlay_validation::{create_validator, ElementValidator, ErrorMap, ValidationMap};

use crate::commands::{default_predicate, Predicate};

#[derive(Error, Debug)]
pub enum ElementError {
    /// The element name was never registered with the plugin. A programmer
    /// error: the message names the valid alternatives.
    #[error("{name} is not recognised. Only {} can be added", .known.join(", "))]
    UnknownElement { name: String, known: Vec<String> },

    /// The element is registered, but the live schema has no node type for
    /// it: the schema fragment was not merged before initialisation. A
    /// wiring error, distinct from an unknown name.
    #[error("{name} is not included in the document schema. Add the node templates generated by the plugin to the schema before the editor is initialised")]
    MissingNodeType { name: String },

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

pub(crate) struct PluginElement {
    pub(crate) compiled: CompiledFieldSpec,
    pub(crate) validator: ElementValidator,
}

/// An element plugin: the registered elements, the schema fragment the host
/// must merge before initialisation, and the commands and state transitions
/// built on top of them.
pub struct ElementPlugin {
    pub(crate) elements: Vec<PluginElement>,
    pub(crate) fragment: SchemaFragment,
    pub(crate) predicate: Predicate,
}

/// Build an element plugin from the given element specs.
///
/// The optional predicate decides which document nodes the query commands
/// treat as elements; it defaults to matching any node whose type is one of
/// the registered element names.
pub fn build_element_plugin(
    mut specs: Vec<ElementSpec>,
    predicate: Option<Predicate>,
) -> Result<ElementPlugin, SpecError> {
    let assembly = assemble(&specs)?;

    let mut elements = Vec::with_capacity(specs.len());
    for (spec, compiled) in specs.iter_mut().zip(assembly.elements) {
        let validator = create_validator(ValidationMap::from_field_spec(&mut spec.fields));
        elements.push(PluginElement {
            compiled,
            validator,
        });
    }

    let names: Vec<String> = elements
        .iter()
        .map(|e| e.compiled.element.clone())
        .collect();
    Ok(ElementPlugin {
        elements,
        fragment: assembly.fragment,
        predicate: predicate.unwrap_or_else(|| default_predicate(names)),
    })
}

impl ElementPlugin {
    /// The schema fragment the host must merge into its schema before the
    /// editor is initialised. Merging later is unsupported.
    pub fn schema_fragment(&self) -> &SchemaFragment {
        &self.fragment
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.compiled.element.as_str())
    }

    pub fn element(&self, name: &str) -> Option<&CompiledFieldSpec> {
        self.elements
            .iter()
            .find(|e| e.compiled.element == name)
            .map(|e| &e.compiled)
    }

    /// The compiled field specs, in registration order, for wiring a
    /// [`inlay_views::ViewRegistry`].
    pub fn compiled_elements(&self) -> Vec<CompiledFieldSpec> {
        self.elements.iter().map(|e| e.compiled.clone()).collect()
    }

    /// Build a transaction inserting the named element, filled from the
    /// given field values, at the current selection.
    ///
    /// Unknown names and missing node types are configuration errors. A
    /// schema that cannot satisfy the element's content expression with the
    /// built children abandons the insertion with a warning and returns
    /// `Ok(None)` rather than corrupting the document.
    pub fn insert_element(
        &self,
        name: &str,
        values: &FieldValues,
        state: &EditorState,
    ) -> Result<Option<Transaction>, ElementError> {
        let element = self
            .elements
            .iter()
            .find(|e| e.compiled.element == name)
            .ok_or_else(|| ElementError::UnknownElement {
                name: name.to_string(),
                known: self.element_names().map(String::from).collect(),
            })?;

        if state.schema().node_type(name).is_none() {
            return Err(ElementError::MissingNodeType {
                name: name.to_string(),
            });
        }

        match element_node_from_values(state.schema(), &element.compiled, values) {
            Some(node) => {
                let mut tr = state.tr();
                tr.replace_selection_with(node)?;
                Ok(Some(tr))
            }
            None => {
                warn!(
                    element = name,
                    "could not create a node for the element; insertion abandoned"
                );
                Ok(None)
            }
        }
    }

    /// Validate a value map for the named element without touching any
    /// document.
    pub fn validate_element_data(
        &self,
        name: &str,
        values: &FieldValues,
    ) -> Result<ErrorMap, ElementError> {
        let element = self
            .elements
            .iter()
            .find(|e| e.compiled.element == name)
            .ok_or_else(|| ElementError::UnknownElement {
                name: name.to_string(),
                known: self.element_names().map(String::from).collect(),
            })?;
        Ok(element.validator.validate(values))
    }
}
