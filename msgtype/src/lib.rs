pub mod parser;
pub mod schema;

use crate::schema::{Element, TypeDefinition};

/// A parsed schema file.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Top-level elements (whitespace runs, comment runs, type definitions)
    /// in source order.
    pub elements: Vec<Element>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl Schema {
    /// The type definitions in source order, skipping whitespace and comment
    /// runs.
    pub fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.elements.iter().filter_map(|element| match element {
            Element::Type(def) => Some(def),
            _ => None,
        })
    }
}
