//! Field extraction from a single HTTP operation of an OpenAPI document.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::loader::navigate_fragment;
use crate::naming::FieldNames;
use crate::typemap::map_type;
use crate::types::{
    json_type_name, Field, FieldMap, FieldType, Location, Operation, OperationView, Origin,
    JSON_MEDIA_TYPE,
};

/// Upper bound on chained `$ref` hops before a reference is treated as cyclic.
const MAX_REF_DEPTH: usize = 32;

/// Extract the parameter and body fields of one operation.
///
/// Path-item and operation parameters in `path` or `query` become immutable
/// fields. Properties of the `application/json` request body schema become
/// mutable fields, required when listed in the schema's `required` array.
///
/// # Errors
///
/// Returns `ExtractError` if the path or operation doesn't exist, a `$ref`
/// is unresolvable, or the request body has no JSON content.
pub fn extract_operation(
    doc: &Value,
    path: &str,
    operation: Operation,
) -> Result<OperationView, ExtractError> {
    let path_item = doc
        .get("paths")
        .and_then(|paths| paths.get(path))
        .ok_or_else(|| ExtractError::PathNotFound {
            path: path.to_string(),
        })?;
    let path_item = resolve_ref(doc, path_item, path)?;

    let op = path_item
        .get(operation.method_key())
        .ok_or_else(|| ExtractError::OperationNotFound {
            method: operation.http_method().to_string(),
            path: path.to_string(),
        })?;

    let ctx = Context {
        doc,
        operation,
        path,
    };

    let parameters = extract_parameters(&ctx, path_item, op)?;
    let body = extract_body(&ctx, op)?;

    debug!(
        "{} {}: {} parameter field(s), body {}",
        operation,
        path,
        parameters.len(),
        match &body {
            Some(fields) => format!("with {} field(s)", fields.len()),
            None => "absent".to_string(),
        }
    );

    Ok(OperationView {
        operation,
        path: path.to_string(),
        parameters,
        body,
    })
}

/// Extract the view standing in for the partial update.
///
/// Uses the PATCH operation when `update_path` is given, otherwise the PUT
/// operation at `replace_path`. Returns `None` when neither is given.
///
/// # Errors
///
/// Propagates extraction errors from the chosen operation.
pub fn extract_update_view(
    doc: &Value,
    update_path: Option<&str>,
    replace_path: Option<&str>,
) -> Result<Option<OperationView>, ExtractError> {
    match (update_path, replace_path) {
        (Some(update), replace) => {
            if let Some(replace) = replace {
                warn!(
                    "both update and replace paths given; using PATCH {} and ignoring PUT {}",
                    update, replace
                );
            }
            extract_operation(doc, update, Operation::PartialUpdate).map(Some)
        }
        (None, Some(replace)) => {
            debug!("no update path; falling back to PUT {}", replace);
            extract_operation(doc, replace, Operation::Replace).map(Some)
        }
        (None, None) => Ok(None),
    }
}

struct Context<'a> {
    doc: &'a Value,
    operation: Operation,
    path: &'a str,
}

impl Context<'_> {
    fn location(&self, suffix: &str) -> String {
        format!("{} {} {}", self.operation, self.path, suffix)
    }

    fn origin(&self, location: Location) -> Origin {
        Origin {
            operation: self.operation,
            location,
        }
    }
}

/// Follow `$ref` pointers until a concrete node is reached.
fn resolve_ref<'a>(
    doc: &'a Value,
    node: &'a Value,
    location: &str,
) -> Result<&'a Value, ExtractError> {
    let mut current = node;
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return Ok(current);
        };
        current =
            navigate_fragment(doc, reference).ok_or_else(|| ExtractError::UnresolvableRef {
                reference: reference.to_string(),
                location: location.to_string(),
            })?;
    }
    Err(ExtractError::InvalidSchema {
        location: location.to_string(),
        message: format!("more than {} chained $ref hops", MAX_REF_DEPTH),
    })
}

/// Collect path-item then operation parameters; operation parameters
/// override path-item ones with the same name and location.
fn extract_parameters(
    ctx: &Context<'_>,
    path_item: &Value,
    op: &Value,
) -> Result<FieldMap, ExtractError> {
    let mut collected: Vec<(String, String, &Value)> = Vec::new();

    for (scope, holder) in [("path item", path_item), ("operation", op)] {
        let Some(params) = holder.get("parameters") else {
            continue;
        };
        let params = params.as_array().ok_or_else(|| ExtractError::InvalidSchema {
            location: ctx.location(&format!("{} parameters", scope)),
            message: format!("expected array, got {}", json_type_name(params)),
        })?;

        for (i, param) in params.iter().enumerate() {
            let location = ctx.location(&format!("{} parameters[{}]", scope, i));
            let param = resolve_ref(ctx.doc, param, &location)?;
            let name = param.get("name").and_then(Value::as_str).unwrap_or("");
            let param_in = param.get("in").and_then(Value::as_str).unwrap_or("");
            if name.is_empty() {
                return Err(ExtractError::EmptyFieldName { location });
            }
            if !matches!(param_in, "path" | "query" | "header" | "cookie") {
                return Err(ExtractError::InvalidSchema {
                    location,
                    message: format!(
                        "missing or unknown parameter location for {:?}",
                        name
                    ),
                });
            }

            match collected
                .iter_mut()
                .find(|(n, loc, _)| n == name && loc == param_in)
            {
                Some(entry) => entry.2 = param,
                None => collected.push((name.to_string(), param_in.to_string(), param)),
            }
        }
    }

    let mut fields = FieldMap::new();
    for (name, param_in, param) in collected {
        let Some(location) = Location::from_parameter_in(&param_in) else {
            debug!(
                "{} {}: skipping {} parameter {:?}",
                ctx.operation, ctx.path, param_in, name
            );
            continue;
        };
        let field = parameter_field(ctx, &name, param, location)?;
        log_type_gap(ctx, &field);
        fields.insert(name, field);
    }
    Ok(fields)
}

fn parameter_field(
    ctx: &Context<'_>,
    name: &str,
    param: &Value,
    location: Location,
) -> Result<Field, ExtractError> {
    let site = ctx.location(&format!("parameter {}", name));
    let required = param
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let field_type = match param.get("schema") {
        Some(schema) => {
            let schema = resolve_ref(ctx.doc, schema, &site)?;
            resolve_field_type(ctx, schema, required, &site)?
        }
        None => resolve_field_type(ctx, &Value::Null, required, &site)?,
    };

    let names = field_names(name, &site)?;
    Ok(Field {
        wire_name: name.to_string(),
        declaration_name: names.declaration,
        serialized_name: names.serialized,
        description: description_of(param),
        field_type,
        enum_values: Vec::new(),
        enum_default: None,
        required,
        immutable: true,
        origin: ctx.origin(location),
    })
}

/// Extract body fields; `None` when the operation declares no request body.
fn extract_body(ctx: &Context<'_>, op: &Value) -> Result<Option<FieldMap>, ExtractError> {
    let Some(request_body) = op.get("requestBody") else {
        return Ok(None);
    };
    let site = ctx.location("requestBody");
    let request_body = resolve_ref(ctx.doc, request_body, &site)?;

    let no_content = Map::new();
    let content = request_body
        .get("content")
        .and_then(Value::as_object)
        .unwrap_or(&no_content);

    let Some(media) = json_media(content) else {
        return Err(ExtractError::UnsupportedContentType {
            method: ctx.operation.http_method().to_string(),
            path: ctx.path.to_string(),
            content_types: content.keys().cloned().collect(),
        });
    };

    let mut fields = FieldMap::new();
    let Some(schema) = media.get("schema") else {
        return Ok(Some(fields));
    };
    let schema = resolve_ref(ctx.doc, schema, &site)?;

    let required_list: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties") else {
        return Ok(Some(fields));
    };
    let properties = properties.as_object().ok_or_else(|| ExtractError::InvalidSchema {
        location: format!("{} properties", site),
        message: format!("expected object, got {}", json_type_name(properties)),
    })?;

    for (name, property) in properties {
        let prop_site = ctx.location(&format!("body property {}", name));
        let property = resolve_ref(ctx.doc, property, &prop_site)?;
        let required = required_list.contains(&name.as_str());
        let names = field_names(name, &prop_site)?;

        let field = Field {
            wire_name: name.clone(),
            declaration_name: names.declaration,
            serialized_name: names.serialized,
            description: description_of(property),
            field_type: resolve_field_type(ctx, property, required, &prop_site)?,
            enum_values: property
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            enum_default: property.get("default").cloned(),
            required,
            immutable: false,
            origin: ctx.origin(Location::Body),
        };
        log_type_gap(ctx, &field);
        fields.insert(name.clone(), field);
    }

    Ok(Some(fields))
}

/// Find the JSON entry of a content map, tolerating media-type parameters
/// such as `application/json; charset=utf-8`.
fn json_media(content: &Map<String, Value>) -> Option<&Value> {
    content.get(JSON_MEDIA_TYPE).or_else(|| {
        content.iter().find_map(|(media_type, media)| {
            let essence = media_type.split(';').next().unwrap_or("").trim();
            essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE).then_some(media)
        })
    })
}

fn resolve_field_type(
    ctx: &Context<'_>,
    schema: &Value,
    required: bool,
    site: &str,
) -> Result<FieldType, ExtractError> {
    let schema_type = type_name(schema);
    let item_type = match schema.get("items") {
        Some(items) => type_name(resolve_ref(ctx.doc, items, site)?),
        None => None,
    };
    Ok(map_type(schema_type.as_deref(), item_type.as_deref(), required).into())
}

/// The declared `type` of a schema node.
///
/// Non-string `type` values (such as OpenAPI 3.1 type arrays) are kept in
/// their JSON text form so they surface as unresolved.
fn type_name(schema: &Value) -> Option<String> {
    match schema.get("type")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn description_of(node: &Value) -> Option<String> {
    node.get("description")
        .and_then(Value::as_str)
        .map(String::from)
}

fn field_names(name: &str, site: &str) -> Result<FieldNames, ExtractError> {
    FieldNames::from_wire(name).ok_or_else(|| ExtractError::EmptyFieldName {
        location: site.to_string(),
    })
}

fn log_type_gap(ctx: &Context<'_>, field: &Field) {
    if let FieldType::Unresolved(unresolved) = &field.field_type {
        debug!(
            "{} {}: field {:?} has unsupported type {}",
            ctx.operation, ctx.path, field.wire_name, unresolved
        );
    }
}
