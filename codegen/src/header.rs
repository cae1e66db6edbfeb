use msgtype::Schema;
use msgtype::schema::field::FieldType;
use msgtype::schema::{Element, Entry, TypeDefinition};

use crate::comment::render_comment_block;
use crate::ctype::storage_type;

/// Render the include-guarded struct-declarations artifact: the element
/// sequence in source order, then one `extern` reflection-object
/// declaration per type.
pub fn generate_header(module: &str, schema: &Schema) -> String {
    let guard = format!("{}_H", module.to_uppercase());
    let mut out = vec![
        "/* THIS FILE IS AUTOMATICALLY GENERATED */".to_string(),
        format!("#ifndef {}", guard),
        format!("#define {}", guard),
        String::new(),
        "#include <stdint.h>".to_string(),
        "#include <msgbus/type_definition.h>".to_string(),
        String::new(),
    ];

    for element in &schema.elements {
        match element {
            Element::Whitespace(ws) => {
                for _ in 0..ws.nb_lines {
                    out.push(String::new());
                }
            }
            Element::Comment(block) => {
                out.extend(render_comment_block(&block.comments, false));
            }
            Element::Type(def) => {
                out.extend(render_struct(def));
            }
        }
    }

    out.push(String::new());
    out.push("/* messagebus type definitions */".to_string());
    for def in schema.type_definitions() {
        out.push(format!(
            "extern const messagebus_type_definition_t {}_type;",
            def.typename
        ));
    }
    out.push(String::new());
    out.push(format!("#endif /* {} */", guard));

    out.join("\n") + "\n"
}

/// Render one struct declaration, preceded by its documentation comment
/// when the type carries a docstring.
pub fn render_struct(def: &TypeDefinition) -> Vec<String> {
    let mut out = Vec::new();
    if !def.docstring.is_empty() {
        out.extend(render_comment_block(&def.docstring, true));
    }
    out.push("typedef struct {".to_string());
    for entry in &def.entries {
        out.extend(render_entry(entry));
    }
    out.push(format!("}} {}_t;", def.typename));
    out
}

/// One or two declaration lines for a field: the field itself, and for
/// dynamic arrays the companion 16-bit occupied-length field.
fn render_entry(entry: &Entry) -> Vec<String> {
    let array = match entry.array_sz() {
        Some(capacity) => format!("[{}]", capacity),
        None => String::new(),
    };
    let string_array = match &entry.field_type {
        FieldType::String { len } => format!("[{}]", len + 1),
        _ => String::new(),
    };
    let doc = if entry.docstring.is_empty() {
        String::new()
    } else {
        format!("  /**<{} */", entry.docstring)
    };
    let mut out = vec![format!(
        "    {} {}{}{};{}",
        storage_type(&entry.field_type),
        entry.name,
        array,
        string_array,
        doc
    )];
    if entry.is_dynamic() {
        out.push(format!("    uint16_t {}_len;", entry.name));
    }
    out
}
