//! End-to-end catalog generation for one resource kind.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::aggregator::{FieldAggregator, FieldCatalog};
use crate::config::{GeneratorConfig, OperationPaths};
use crate::error::GenerateError;
use crate::extractor::{extract_operation, extract_update_view};
use crate::loader::load_document_auto;
use crate::types::{FieldType, Operation};

/// Kind, version, and catalog handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceManifest {
    pub kind: String,
    pub version: String,
    pub fields: FieldCatalog,
}

/// Extract the create, update, and delete views of a resource and reconcile
/// them into one catalog.
///
/// # Errors
///
/// Returns `GenerateError::Extract` if any requested operation cannot be
/// extracted, or `GenerateError::Aggregate` on an aggregator consistency
/// fault. No partial catalog is produced.
pub fn build_catalog(doc: &Value, paths: &OperationPaths) -> Result<FieldCatalog, GenerateError> {
    let create = extract_operation(doc, &paths.create, Operation::Create)?;
    let update = extract_update_view(doc, paths.update.as_deref(), paths.replace.as_deref())?;
    let delete = paths
        .delete
        .as_deref()
        .map(|path| extract_operation(doc, path, Operation::Delete))
        .transpose()?;

    let mut aggregator = FieldAggregator::seed(&create);
    if let Some(update) = &update {
        aggregator.merge_update(update);
    }
    if let Some(delete) = &delete {
        aggregator.merge_delete(delete);
    }
    Ok(aggregator.finish()?)
}

/// Load the configured document and build the resource manifest.
///
/// Unresolved field types are logged as warnings; with `strict` they fail
/// the run instead.
///
/// # Errors
///
/// Returns `GenerateError` from loading, extraction, aggregation, or
/// `GenerateError::UnresolvedTypes` in strict mode.
pub fn generate(
    config: &GeneratorConfig,
    strict: bool,
) -> Result<ResourceManifest, GenerateError> {
    let doc = load_document_auto(&config.schema)?;
    let fields = build_catalog(&doc, &config.operations)?;
    check_resolved(&fields, strict)?;

    info!(
        "{} {}: {} field(s) from {}",
        config.kind,
        config.version,
        fields.len(),
        config.schema
    );

    Ok(ResourceManifest {
        kind: config.kind.clone(),
        version: config.version.clone(),
        fields,
    })
}

/// Report fields whose types could not be resolved.
///
/// # Errors
///
/// Returns `GenerateError::UnresolvedTypes` when `strict` is set and any
/// field is unresolved.
pub fn check_resolved(catalog: &FieldCatalog, strict: bool) -> Result<(), GenerateError> {
    let mut unresolved = Vec::new();
    for field in catalog.unresolved() {
        if let FieldType::Unresolved(gap) = &field.field_type {
            warn!("field {:?} has unsupported type {}", field.wire_name, gap);
        }
        unresolved.push(field.wire_name.clone());
    }

    if strict && !unresolved.is_empty() {
        return Err(GenerateError::UnresolvedTypes { fields: unresolved });
    }
    Ok(())
}

/// Serialize a manifest as JSON.
pub fn manifest_json(
    manifest: &ResourceManifest,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(manifest)
    } else {
        serde_json::to_string(manifest)
    }
}

/// Write the manifest into `output_dir`, creating the directory if needed.
///
/// # Errors
///
/// Returns `GenerateError::WriteError` if the directory or file cannot be
/// written.
pub fn write_manifest(
    output_dir: &Path,
    file_name: &str,
    content: &str,
) -> Result<PathBuf, GenerateError> {
    std::fs::create_dir_all(output_dir).map_err(|source| GenerateError::WriteError {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(file_name);
    std::fs::write(&path, content).map_err(|source| GenerateError::WriteError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
