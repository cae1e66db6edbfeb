pub mod field;

use crate::schema::field::{ArraySpec, FieldType};

/// A top-level element of a schema file.
/// The closed set of kinds a generator has to handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A run of consecutive blank lines outside any type body.
    Whitespace(WhitespaceBlock),
    /// A run of consecutive comment-only lines outside any type body.
    Comment(CommentBlock),
    /// A record type definition.
    Type(TypeDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhitespaceBlock {
    pub nb_lines: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentBlock {
    /// Comment bodies in source order, leading space preserved.
    pub comments: Vec<String>,
}

/// A named record type with an ordered list of typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub typename: String,
    /// Comment lines immediately preceding the header line, plus the
    /// header's own trailing comment. Empty if none.
    pub docstring: Vec<String>,
    /// Fields in declaration order. This order is the struct's memory
    /// layout order and the order of the reflection table.
    pub entries: Vec<Entry>,
}

/// One field within a type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub field_type: FieldType,
    pub name: String,
    /// Trailing comment on the entry line; empty if none.
    pub docstring: String,
    /// Array suffix, if any. `None` means a scalar field.
    pub array: Option<ArraySpec>,
}

impl Entry {
    /// Declared capacity, if the field is an array.
    pub fn array_sz(&self) -> Option<u32> {
        self.array.map(ArraySpec::capacity)
    }

    /// True when the occupied length varies at runtime up to the capacity.
    pub fn is_dynamic(&self) -> bool {
        self.array.is_some_and(ArraySpec::is_dynamic)
    }
}
