use crate::error::SpecificationError;
use crate::loader;
use crate::specification::SpecificationOptions;
use crate::types::version::OpenApiVersion;
use crate::validator::OpenApiPayloadValidator;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug)]
pub enum ValidatorBuilderError {
    InvalidOption(String),
    InvalidVersion(String),
    InvalidSpecification(String),
    LoadFailure(String),
}

impl ValidatorBuilderError {
    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    pub fn invalid_version(msg: impl Into<String>) -> Self {
        Self::InvalidVersion(msg.into())
    }

    pub fn invalid_specification(msg: impl Into<String>) -> Self {
        Self::InvalidSpecification(msg.into())
    }

    pub fn load_failure(msg: impl Into<String>) -> Self {
        Self::LoadFailure(msg.into())
    }
}

impl From<SpecificationError> for ValidatorBuilderError {
    fn from(value: SpecificationError) -> Self {
        match value {
            SpecificationError::LoadFailed(msg) => ValidatorBuilderError::load_failure(msg),
            SpecificationError::UnsupportedVersion(version) => {
                ValidatorBuilderError::invalid_version(version)
            }
            other => ValidatorBuilderError::invalid_specification(other.to_string()),
        }
    }
}

impl Display for ValidatorBuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorBuilderError::InvalidOption(msg) => {
                write!(f, "Invalid Option: {}", msg)
            }
            ValidatorBuilderError::InvalidVersion(msg) => {
                write!(f, "Invalid Version: {}", msg)
            }
            ValidatorBuilderError::InvalidSpecification(msg) => {
                write!(f, "Invalid Specification: {}", msg)
            }
            ValidatorBuilderError::LoadFailure(msg) => {
                write!(f, "Load Failure: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValidatorBuilderError {}

enum SpecificationLoader {
    None,
    File(PathBuf),
    Value(Value),
}

/// Configures and builds an [`OpenApiPayloadValidator`].
///
/// # Examples
/// ```rust
/// use oasgate::validator::OpenApiPayloadValidatorBuilder;
///
/// let validator = OpenApiPayloadValidatorBuilder::new()
///     .specification(serde_json::json!({ "openapi": "3.0.3", "paths": {} }))
///     .root_id("urn:example:api")
///     .require_nested_parents(true)
///     .build()
///     .unwrap();
/// assert_eq!(validator.specification().root_id(), "urn:example:api");
/// ```
pub struct OpenApiPayloadValidatorBuilder {
    specification_loader: SpecificationLoader,
    version: Option<Result<OpenApiVersion, String>>,
    options: SpecificationOptions,
}

impl Default for OpenApiPayloadValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiPayloadValidatorBuilder {
    pub fn new() -> Self {
        Self {
            specification_loader: SpecificationLoader::None,
            version: None,
            options: SpecificationOptions::default(),
        }
    }

    /// Validates with the given OpenAPI version instead of the document's own.
    pub fn version(mut self, version: impl AsRef<str>) -> Self {
        let version = version.as_ref();
        self.version = Some(OpenApiVersion::from_str(version).map_err(|_| version.to_string()));
        self
    }

    /// Identifier the document is registered under with the schema engine.
    pub fn root_id(mut self, root_id: impl Into<String>) -> Self {
        self.options.root_id = root_id.into();
        self
    }

    /// Marks a bracketed parameter's parent object as required whenever one
    /// of its nested fields is.
    pub fn require_nested_parents(mut self, require: bool) -> Self {
        self.options.parameters.require_nested_parents = require;
        self
    }

    pub fn load_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.specification_loader = SpecificationLoader::File(path.into());
        self
    }

    /// Uses an already parsed document.
    pub fn specification(mut self, document: Value) -> Self {
        self.specification_loader = SpecificationLoader::Value(document);
        self
    }

    pub fn build(self) -> Result<OpenApiPayloadValidator, ValidatorBuilderError> {
        let document = match self.specification_loader {
            SpecificationLoader::None => {
                return Err(ValidatorBuilderError::invalid_option(
                    "No specification loader provided.",
                ));
            }
            SpecificationLoader::File(path) => loader::load_from_path(path)?,
            SpecificationLoader::Value(document) => document,
        };

        let mut options = self.options;
        match self.version {
            None => {}
            Some(Ok(version)) => options.version = Some(version),
            Some(Err(version)) => return Err(ValidatorBuilderError::invalid_version(version)),
        }

        if options.root_id.is_empty() {
            return Err(ValidatorBuilderError::invalid_option("Root id must not be empty."));
        }

        let validator = OpenApiPayloadValidator::with_options(document, &options)?;
        log::debug!(
            "Built payload validator for {} operation(s)",
            validator.specification().operations().len()
        );
        Ok(validator)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::version::OpenApiVersion;
    use serde_json::json;

    fn fixture(file: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), file)
    }

    #[test]
    fn test_build_from_file() {
        let validator = OpenApiPayloadValidatorBuilder::new()
            .load_from_file(fixture("petstore.yaml"))
            .build()
            .unwrap();
        assert_eq!(validator.specification().operations().len(), 4);
        assert_eq!(validator.specification().version(), OpenApiVersion::V30x);
    }

    #[test]
    fn test_build_without_loader() {
        let result = OpenApiPayloadValidatorBuilder::new().build();
        assert!(matches!(result, Err(ValidatorBuilderError::InvalidOption(_))));
    }

    #[test]
    fn test_build_with_missing_file() {
        let result = OpenApiPayloadValidatorBuilder::new()
            .load_from_file(fixture("missing.yaml"))
            .build();
        assert!(matches!(result, Err(ValidatorBuilderError::LoadFailure(_))));
    }

    #[test]
    fn test_build_with_bad_version() {
        let result = OpenApiPayloadValidatorBuilder::new()
            .specification(json!({ "openapi": "3.1.0", "paths": {} }))
            .version("2.0")
            .build();
        assert!(matches!(result, Err(ValidatorBuilderError::InvalidVersion(_))));

        let result = OpenApiPayloadValidatorBuilder::new()
            .specification(json!({ "swagger": "2.0", "paths": {} }))
            .build();
        assert!(matches!(result, Err(ValidatorBuilderError::InvalidVersion(_))));
    }

    #[test]
    fn test_version_override() {
        let validator = OpenApiPayloadValidatorBuilder::new()
            .specification(json!({ "openapi": "3.0.3", "paths": {} }))
            .version("3.1.0")
            .build()
            .unwrap();
        assert_eq!(validator.specification().version(), OpenApiVersion::V31x);
    }

    #[test]
    fn test_build_with_invalid_document() {
        let result = OpenApiPayloadValidatorBuilder::new()
            .specification(json!({
                "openapi": "3.1.0",
                "paths": { "/pets": { "get": { "$ref": "#/nowhere" } } }
            }))
            .build();
        assert!(matches!(
            result,
            Err(ValidatorBuilderError::InvalidSpecification(_))
        ));
    }

    #[test]
    fn test_require_nested_parents() {
        let document = json!({
            "openapi": "3.1.0",
            "paths": {
                "/search": {
                    "get": {
                        "parameters": [
                            { "name": "filter[tag]", "in": "query", "required": true,
                              "schema": { "type": "string" } }
                        ],
                        "responses": {}
                    }
                }
            }
        });

        let validator = OpenApiPayloadValidatorBuilder::new()
            .specification(document.clone())
            .build()
            .unwrap();
        let operation = validator.specification().find_operation("get", "/search").unwrap();
        assert!(operation.parameters_json_schema().get("required").is_none());

        let validator = OpenApiPayloadValidatorBuilder::new()
            .specification(document)
            .require_nested_parents(true)
            .build()
            .unwrap();
        let operation = validator.specification().find_operation("get", "/search").unwrap();
        assert_eq!(operation.parameters_json_schema()["required"], json!(["filter"]));
    }

    #[test]
    fn test_empty_root_id() {
        let result = OpenApiPayloadValidatorBuilder::new()
            .specification(json!({ "openapi": "3.1.0" }))
            .root_id("")
            .build();
        assert!(matches!(result, Err(ValidatorBuilderError::InvalidOption(_))));
    }
}
