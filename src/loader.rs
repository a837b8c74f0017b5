use crate::error::{Section, SpecificationError, SpecificationSection};
use crate::traverser::OpenApiTraverser;
use serde_json::Value;
use std::path::Path;

/// Serialization of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` and `.yml` files are YAML, everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Parses a document without resolving references.
pub fn load_from_str(content: &str, format: DocumentFormat) -> Result<Value, SpecificationError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content)
            .map_err(|e| SpecificationError::UnableToParse(e.to_string())),
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| SpecificationError::UnableToParse(e.to_string())),
    }
}

/// Reads and parses a document without resolving references.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Value, SpecificationError> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return Err(SpecificationError::LoadFailed(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }
    };
    log::debug!("Loaded specification from {}", path.display());
    load_from_str(&content, DocumentFormat::from_path(path))
}

/// Resolves every local `$ref` of `document` in place.
///
/// See [`OpenApiTraverser::dereference`] for how recursive references are kept.
pub fn dereference(document: &mut Value, root_id: &str) -> Result<(), SpecificationError> {
    OpenApiTraverser::dereference(document, root_id).map_err(|e| {
        SpecificationError::traversal_failed(e, Section::Specification(SpecificationSection::Other))
    })
}
