//! Core types shared by extraction and reconciliation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media type whose schema describes the request body fields.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP operation of a resource that can contribute fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// POST
    Create,
    /// PUT
    Replace,
    /// PATCH
    PartialUpdate,
    /// DELETE
    Delete,
}

impl Operation {
    /// Returns the path-item key for this operation in an OpenAPI document.
    pub fn method_key(&self) -> &'static str {
        match self {
            Operation::Create => "post",
            Operation::Replace => "put",
            Operation::PartialUpdate => "patch",
            Operation::Delete => "delete",
        }
    }

    /// Returns the upper-case HTTP method for messages.
    pub fn http_method(&self) -> &'static str {
        match self {
            Operation::Create => "POST",
            Operation::Replace => "PUT",
            Operation::PartialUpdate => "PATCH",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.http_method())
    }
}

/// Where in the request a field was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    /// Parse a parameter `in` value.
    ///
    /// Returns `None` for header and cookie parameters, which are not
    /// resource attributes.
    pub fn from_parameter_in(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Location::Path),
            "query" => Some(Location::Query),
            _ => None,
        }
    }

    /// True for locations that come from the parameter list.
    pub fn is_parameter(&self) -> bool {
        !matches!(self, Location::Body)
    }
}

/// Operation and location that contributed a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub operation: Operation,
    pub location: Location,
}

/// Primitive schema kinds the bindings support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Integer,
    String,
    Boolean,
}

impl Primitive {
    /// Parse an OpenAPI `type` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(Primitive::Integer),
            "string" => Some(Primitive::String),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }

    fn notation(&self) -> &'static str {
        match self {
            Primitive::Integer => "int",
            Primitive::String => "string",
            Primitive::Boolean => "bool",
        }
    }
}

/// Resolved target type of a field.
///
/// Displays in the bindings' type notation: `int`, `*int`, `[]string`,
/// `*[]string`, and so on. Nullable types carry a leading `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct TargetType {
    pub primitive: Primitive,
    pub array: bool,
    pub nullable: bool,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            f.write_str("*")?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        f.write_str(self.primitive.notation())
    }
}

impl From<TargetType> for String {
    fn from(value: TargetType) -> Self {
        value.to_string()
    }
}

/// A schema type outside the supported primitive set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedType {
    /// The declared `type`, or `None` when the schema node has none.
    pub schema_type: Option<String>,
    /// The declared `items.type` for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

impl fmt::Display for UnresolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.schema_type, &self.item_type) {
            (Some(t), Some(item)) => write!(f, "{}<{}>", t, item),
            (Some(t), None) => f.write_str(t),
            (None, _) => f.write_str("<untyped>"),
        }
    }
}

/// Type resolution outcome attached to every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Resolved(TargetType),
    Unresolved(UnresolvedType),
}

impl FieldType {
    pub fn resolved(&self) -> Option<&TargetType> {
        match self {
            FieldType::Resolved(t) => Some(t),
            FieldType::Unresolved(_) => None,
        }
    }
}

impl From<Result<TargetType, UnresolvedType>> for FieldType {
    fn from(value: Result<TargetType, UnresolvedType>) -> Self {
        match value {
            Ok(t) => FieldType::Resolved(t),
            Err(u) => FieldType::Unresolved(u),
        }
    }
}

/// One resource attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub wire_name: String,
    pub declaration_name: String,
    pub serialized_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_default: Option<Value>,
    pub required: bool,
    pub immutable: bool,
    pub origin: Origin,
}

/// Fields keyed by wire name.
pub type FieldMap = BTreeMap<String, Field>;

/// Extraction result for one HTTP operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationView {
    pub operation: Operation,
    pub path: String,
    /// Path and query parameters.
    pub parameters: FieldMap,
    /// `None` when the operation declares no request body.
    pub body: Option<FieldMap>,
}

impl OperationView {
    /// Body fields, or an empty iterator when there is no body.
    pub fn body_fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.body.iter().flat_map(|body| body.iter())
    }
}
