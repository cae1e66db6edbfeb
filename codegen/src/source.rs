use msgtype::Schema;
use msgtype::schema::field::FieldType;
use msgtype::schema::{Entry, TypeDefinition};

use crate::ctype::{base_type_tag, size_expr};

/// Render the reflection-metadata artifact: one field-descriptor table and
/// one type descriptor per type, in source order. The tables are everything
/// a generic marshaller needs to walk instances of the compiled types.
pub fn generate_source(module: &str, schema: &Schema) -> String {
    let mut out = vec![
        "/* THIS FILE IS AUTOMATICALLY GENERATED */".to_string(),
        "#include <stddef.h>".to_string(),
        "#include <msgbus/type_definition.h>".to_string(),
        format!("#include \"{}.h\"", module),
        String::new(),
    ];
    for def in schema.type_definitions() {
        out.extend(render_type_descriptor(def));
        out.push(String::new());
    }
    out.join("\n") + "\n"
}

/// Render one type's entries table and aggregate descriptor.
pub fn render_type_descriptor(def: &TypeDefinition) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!(
        "static const messagebus_type_entry_t {}_entries[] = {{",
        def.typename
    ));
    for entry in &def.entries {
        out.extend(render_entry_descriptor(&def.typename, entry));
    }
    out.push("};".to_string());
    out.push(String::new());
    out.push(format!(
        "const messagebus_type_definition_t {}_type = {{",
        def.typename
    ));
    out.push(format!("    .nb_elements = {},", def.entries.len()));
    out.push(format!("    .elements = {}_entries,", def.typename));
    out.push(format!("    .struct_size = sizeof({}_t),", def.typename));
    out.push("};".to_string());
    out
}

/// One descriptor initializer per field. Offsets and struct sizes are
/// delegated to the C compiler via `offsetof`/`sizeof` so padding is always
/// respected.
fn render_entry_descriptor(typename: &str, entry: &Entry) -> Vec<String> {
    let is_fixed_array = entry.array.is_some() && !entry.is_dynamic();
    let len_offset = if entry.is_dynamic() {
        format!("offsetof({}_t, {}_len)", typename, entry.name)
    } else {
        "0".to_string()
    };
    let mut out = vec![
        "    {".to_string(),
        format!("        .name = \"{}\",", entry.name),
        format!(
            "        .is_base_type = {},",
            entry.field_type.is_base() as u8
        ),
        format!("        .is_array = {},", is_fixed_array as u8),
        format!("        .is_dynamic_array = {},", entry.is_dynamic() as u8),
        format!("        .array_len = {},", entry.array_sz().unwrap_or(0)),
        format!(
            "        .dynamic_array_len_struct_offset = {},",
            len_offset
        ),
        format!(
            "        .struct_offset = offsetof({}_t, {}),",
            typename, entry.name
        ),
    ];
    if let Some(tag) = base_type_tag(&entry.field_type) {
        out.push(format!("        .base_type = {},", tag));
    } else if let FieldType::Custom(name) = &entry.field_type {
        out.push(format!("        .type = &{}_type,", name));
    }
    out.push(format!("        .size = {},", size_expr(&entry.field_type)));
    out.push("    },".to_string());
    out
}
