//! API schema document loading.
//!
//! Handles loading OpenAPI documents in JSON or YAML from files, strings,
//! and HTTP URLs.

use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests. Public API documents can be large.
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from the source name's extension, falling back to
    /// sniffing the content (a leading `{` means JSON).
    pub fn detect(source: &str, content: &str) -> Self {
        let name = source.split(['?', '#']).next().unwrap_or(source);
        let lower = name.to_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            DocumentFormat::Yaml
        } else if lower.ends_with(".json") || content.trim_start().starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or a parse
/// error if the content isn't valid for its detected format.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let format = DocumentFormat::detect(&path.to_string_lossy(), &content);
    debug!("loaded {} ({:?}, {} bytes)", path.display(), format, content.len());
    load_document_str(&content, format)
}

/// Parse a document from a string in the given format.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` or `LoadError::InvalidYaml`.
pub fn load_document_str(content: &str, format: DocumentFormat) -> Result<Value, LoadError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
        }
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map(yaml_to_json)
            .map_err(|source| LoadError::InvalidYaml { source }),
    }
}

/// Convert a YAML tree into a JSON tree.
///
/// Non-string mapping keys (e.g. unquoted `200:` response codes) are
/// stringified.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                match n.as_f64().and_then(serde_json::Number::from_f64) {
                    Some(f) => Value::Number(f),
                    None => {
                        warn!("YAML number {} has no JSON form; loading it as null", n);
                        Value::Null
                    }
                }
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status, or a parse error for invalid content.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;
    let content = response.text().map_err(network_error)?;

    let format = DocumentFormat::detect(url, &content);
    debug!("fetched {} ({:?}, {} bytes)", url, format, content.len());
    load_document_str(&content, format)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a local JSON Pointer reference (e.g., "#/components/schemas/Token").
///
/// Returns `None` for external references or when the target doesn't exist.
pub fn navigate_fragment<'a>(document: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(document);
    }
    // JSON Pointer unescaping (~1 = /, ~0 = ~) is handled by Value::pointer
    document.pointer(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_document_json_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{"openapi": "3.0.0"}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
    }

    #[test]
    fn load_document_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "openapi: 3.0.0\npaths:\n  /projects: {{}}").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
        assert!(doc["paths"]["/projects"].is_object());
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/openapi.yaml"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_document(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn yaml_numeric_keys_are_stringified() {
        let doc = load_document_str(
            "responses:\n  200:\n    description: ok\n  default:\n    description: err\n",
            DocumentFormat::Yaml,
        )
        .unwrap();
        assert_eq!(doc["responses"]["200"]["description"], "ok");
        assert_eq!(doc["responses"]["default"]["description"], "err");
    }

    #[test]
    fn yaml_non_finite_numbers_load_as_null() {
        let doc = load_document_str(
            "schema:\n  default: .inf\n  enum: [1.5, .nan]\n",
            DocumentFormat::Yaml,
        )
        .unwrap();
        assert!(doc["schema"]["default"].is_null());
        assert_eq!(doc["schema"]["enum"][0], 1.5);
        assert!(doc["schema"]["enum"][1].is_null());
    }

    #[test]
    fn load_document_str_invalid_yaml() {
        let result = load_document_str("key: [unclosed", DocumentFormat::Yaml);
        assert!(matches!(result, Err(LoadError::InvalidYaml { .. })));
    }

    #[test]
    fn detect_by_extension() {
        assert_eq!(DocumentFormat::detect("api.yaml", "{}"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::detect("api.YML", ""), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::detect("api.json", "a: b"), DocumentFormat::Json);
        assert_eq!(
            DocumentFormat::detect("https://host/openapi.yaml?ref=main", "{}"),
            DocumentFormat::Yaml
        );
    }

    #[test]
    fn detect_by_content() {
        assert_eq!(
            DocumentFormat::detect("https://host/openapi", "  {\"openapi\": 1}"),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::detect("https://host/openapi", "openapi: 3.0.0"),
            DocumentFormat::Yaml
        );
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://gitlab.com/openapi.yaml"));
        assert!(is_url("http://localhost/openapi.json"));
        assert!(!is_url("./openapi.yaml"));
        assert!(!is_url("/abs/openapi.yaml"));
    }

    #[test]
    fn navigate_fragment_resolves_pointer() {
        let doc = serde_json::json!({
            "components": { "schemas": { "Token": { "type": "object" } } }
        });
        let target = navigate_fragment(&doc, "#/components/schemas/Token").unwrap();
        assert_eq!(target["type"], "object");
    }

    #[test]
    fn navigate_fragment_unescapes() {
        let doc = serde_json::json!({ "paths": { "/projects/{id}": { "get": {} } } });
        assert!(navigate_fragment(&doc, "#/paths/~1projects~1{id}/get").is_some());
    }

    #[test]
    fn navigate_fragment_missing_or_external() {
        let doc = serde_json::json!({ "components": {} });
        assert!(navigate_fragment(&doc, "#/components/schemas/Missing").is_none());
        assert!(navigate_fragment(&doc, "other.yaml#/components").is_none());
        assert!(navigate_fragment(&doc, "#").is_some());
    }
}
