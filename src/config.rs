//! Generator configuration.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Paths of the operations that describe one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPaths {
    /// POST path that creates the resource.
    pub create: String,
    /// PATCH path that partially updates the resource.
    pub update: Option<String>,
    /// PUT path, used only when `update` is absent.
    pub replace: Option<String>,
    /// DELETE path.
    pub delete: Option<String>,
}

impl OperationPaths {
    pub fn new(create: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            update: None,
            replace: None,
            delete: None,
        }
    }

    pub fn update(mut self, path: impl Into<String>) -> Self {
        self.update = Some(path.into());
        self
    }

    pub fn replace(mut self, path: impl Into<String>) -> Self {
        self.replace = Some(path.into());
        self
    }

    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.delete = Some(path.into());
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_path("create", &self.create)?;
        for (operation, path) in [
            ("update", &self.update),
            ("replace", &self.replace),
            ("delete", &self.delete),
        ] {
            if let Some(path) = path {
                check_path(operation, path)?;
            }
        }
        Ok(())
    }
}

/// Validated settings for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Schema document source: file path or http(s) URL.
    pub schema: String,
    /// Resource kind, e.g. `ProjectAccessToken`.
    pub kind: String,
    /// Resource API version, e.g. `v1alpha1`.
    pub version: String,
    pub operations: OperationPaths,
    /// Directory for the manifest file; stdout when absent.
    pub output_dir: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Build a configuration, rejecting invalid values.
    ///
    /// Empty optional paths are treated as not given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty or non-alphanumeric kind, an empty
    /// version, or an operation path that doesn't start with `/`.
    pub fn validated(
        schema: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
        mut operations: OperationPaths,
        output_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let kind = kind.into().trim().to_string();
        let version = version.into().trim().to_string();

        if kind.is_empty() {
            return Err(ConfigError::EmptyKind);
        }
        let mut chars = kind.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidKind { kind });
        }
        if version.is_empty() {
            return Err(ConfigError::EmptyVersion);
        }

        for path in [
            &mut operations.update,
            &mut operations.replace,
            &mut operations.delete,
        ] {
            if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                *path = None;
            }
        }
        operations.validate()?;

        Ok(Self {
            schema: schema.into(),
            kind,
            version,
            operations,
            output_dir,
        })
    }

    /// File name of the manifest written into `output_dir`.
    pub fn manifest_file_name(&self) -> String {
        format!("{}_fields.json", self.kind.to_lowercase())
    }
}

fn check_path(operation: &str, path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath {
            operation: operation.to_string(),
            path: path.to_string(),
        })
    }
}
