//! Resource field catalog generator
//!
//! Reconciles the create, update, and delete operations of one REST resource
//! in an OpenAPI v3 document into a single catalog of typed fields, which a
//! renderer turns into strongly typed bindings.
//!
//! # Example
//!
//! ```
//! use kindgen::{build_catalog, OperationPaths};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "paths": {
//!         "/tokens": {
//!             "post": {
//!                 "requestBody": { "content": { "application/json": { "schema": {
//!                     "required": ["name"],
//!                     "properties": {
//!                         "name": { "type": "string" },
//!                         "expires_at": { "type": "string" }
//!                     }
//!                 } } } }
//!             }
//!         },
//!         "/tokens/{id}": {
//!             "patch": {
//!                 "parameters": [
//!                     { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
//!                 ],
//!                 "requestBody": { "content": { "application/json": { "schema": {
//!                     "properties": { "name": { "type": "string" } }
//!                 } } } }
//!             }
//!         }
//!     }
//! });
//!
//! let paths = OperationPaths::new("/tokens").update("/tokens/{id}");
//! let catalog = build_catalog(&doc, &paths).unwrap();
//!
//! // "expires_at" can only be set on create
//! assert!(catalog.get("expires_at").unwrap().immutable);
//! assert!(!catalog.get("name").unwrap().immutable);
//! // path parameters always identify, never mutate
//! assert!(catalog.get("id").unwrap().immutable);
//! ```
//!
//! # Reconciliation Rules
//!
//! | Rule | Source | Effect |
//! |------|--------|--------|
//! | 1 | create parameters and body | Seed the catalog |
//! | 2 | update (or replace) parameters and body | Insert absent fields; promote optional to required |
//! | 3 | delete parameters | Insert absent fields |
//! | 4 | create body vs update body | Create-only body fields become immutable |

mod aggregator;
mod config;
mod error;
mod extractor;
mod loader;
mod naming;
mod pipeline;
mod typemap;
mod types;

pub use aggregator::{FieldAggregator, FieldCatalog};
pub use config::{GeneratorConfig, OperationPaths};
pub use error::{AggregateError, ConfigError, ExtractError, GenerateError, LoadError};
pub use extractor::{extract_operation, extract_update_view};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, navigate_fragment,
    DocumentFormat,
};
pub use naming::FieldNames;
pub use pipeline::{
    build_catalog, check_resolved, generate, manifest_json, write_manifest, ResourceManifest,
};
pub use typemap::map_type;
pub use types::{
    Field, FieldMap, FieldType, Location, Operation, OperationView, Origin, Primitive, TargetType,
    UnresolvedType,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
