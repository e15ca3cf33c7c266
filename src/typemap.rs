//! Schema type to target type mapping.

use crate::types::{Primitive, TargetType, UnresolvedType};

/// Resolve a schema `type` (and `items.type` for arrays) into a target type.
///
/// Supported kinds are `integer`, `string`, `boolean`, and arrays of those.
/// Required fields map to non-nullable types, optional fields to nullable ones.
///
/// # Errors
///
/// Returns `UnresolvedType` for any other type, including arrays whose item
/// type is missing or unsupported.
pub fn map_type(
    schema_type: Option<&str>,
    item_type: Option<&str>,
    required: bool,
) -> Result<TargetType, UnresolvedType> {
    let unresolved = || UnresolvedType {
        schema_type: schema_type.map(String::from),
        item_type: item_type.map(String::from),
    };

    let (primitive, array) = match schema_type {
        Some("array") => {
            let item = item_type.and_then(Primitive::parse).ok_or_else(unresolved)?;
            (item, true)
        }
        Some(t) => (Primitive::parse(t).ok_or_else(unresolved)?, false),
        None => return Err(unresolved()),
    };

    Ok(TargetType {
        primitive,
        array,
        nullable: !required,
    })
}
