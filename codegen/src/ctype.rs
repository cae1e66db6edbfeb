use msgtype::schema::field::FieldType;

/// C storage type used to declare a field of the given schema type.
pub(crate) fn storage_type(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Int32 => "int32_t".to_string(),
        FieldType::Float32 => "float".to_string(),
        FieldType::String { .. } => "char".to_string(),
        FieldType::Custom(name) => format!("{}_t", name),
    }
}

/// Enumerated base-type tag for the reflection tables; `None` for custom
/// types, which carry a descriptor reference instead.
pub(crate) fn base_type_tag(field_type: &FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Int32 => Some("MESSAGEBUS_TYPE_INT32"),
        FieldType::Float32 => Some("MESSAGEBUS_TYPE_FLOAT32"),
        FieldType::String { .. } => Some("MESSAGEBUS_TYPE_STRING"),
        FieldType::Custom(_) => None,
    }
}

/// C expression for the storage size of one element of the given type.
/// Strings are the one case where only the schema knows the byte count, so
/// it is emitted as a literal instead of a `sizeof`.
pub(crate) fn size_expr(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Int32 => "sizeof(int32_t)".to_string(),
        FieldType::Float32 => "sizeof(float)".to_string(),
        FieldType::String { len } => (len + 1).to_string(),
        FieldType::Custom(name) => format!("sizeof({}_t)", name),
    }
}
