pub mod builder;
mod request_body;
mod request_parameter;
mod response;

pub use crate::validator::builder::{OpenApiPayloadValidatorBuilder, ValidatorBuilderError};

use crate::converter::HttpLike;
use crate::error::{Section, SpecificationError, SpecificationSection, ValidationErrorType};
use crate::operation::Operation;
use crate::specification::{RouteMatch, Specification, SpecificationOptions};
use crate::types::json_path::JsonPath;
use crate::validator::request_body::RequestBodyValidator;
use crate::validator::request_parameter::RequestParameterValidator;
use crate::validator::response::ResponseValidator;
use dashmap::{DashMap, Entry};
use http::HeaderMap;
use jsonschema::{Resource, ValidationOptions, Validator as JsonValidator};
use serde_json::Value;
use std::sync::Arc;

/// Compiled JSON Schema validators keyed by the location of their schema.
///
/// Every schema is compiled against the same options, which carry the whole
/// document as a resource so references kept by the loader still resolve.
pub(crate) struct CompiledSchemas {
    options: ValidationOptions,
    compiled: DashMap<String, Arc<JsonValidator>>,
}

impl CompiledSchemas {
    fn new(specification: &Specification) -> Result<Self, SpecificationError> {
        let resource = match Resource::from_contents(specification.document().clone()) {
            Ok(resource) => resource,
            Err(e) => return Err(SpecificationError::UnableToParse(e.to_string())),
        };
        let options = JsonValidator::options()
            .with_draft(specification.version().get_draft())
            .with_resource(specification.root_id(), resource);
        Ok(Self {
            options,
            compiled: DashMap::new(),
        })
    }

    /// Returns the validator for `schema`, compiling it on first use.
    pub(crate) fn get_or_compile(
        &self,
        location: &JsonPath,
        schema: &Value,
    ) -> Result<Arc<JsonValidator>, ValidationErrorType> {
        match self.compiled.entry(location.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let validator = Arc::new(Self::build_validator(&self.options, schema)?);
                log::debug!("Compiled schema at {}", location);
                entry.insert(validator.clone());
                Ok(validator)
            }
        }
    }

    fn build_validator(
        validation_options: &ValidationOptions,
        schema: &Value,
    ) -> Result<JsonValidator, ValidationErrorType> {
        match validation_options.build(schema) {
            Ok(validator) => Ok(validator),
            Err(e) => Err(ValidationErrorType::SchemaValidationFailed(
                e.to_string(),
                Section::Specification(SpecificationSection::Other),
            )),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.compiled.len()
    }
}

/// Validates requests and responses against a loaded document.
pub struct OpenApiPayloadValidator {
    specification: Specification,
    schemas: CompiledSchemas,
}

impl OpenApiPayloadValidator {
    pub fn new(document: Value) -> Result<Self, SpecificationError> {
        Self::with_options(document, &SpecificationOptions::default())
    }

    pub fn with_options(
        document: Value,
        options: &SpecificationOptions,
    ) -> Result<Self, SpecificationError> {
        let specification = Specification::with_options(document, options)?;
        Self::from_specification(specification)
    }

    pub fn from_specification(specification: Specification) -> Result<Self, SpecificationError> {
        let schemas = CompiledSchemas::new(&specification)?;
        Ok(Self {
            specification,
            schemas,
        })
    }

    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    /// Returns the media type of a `Content-Type` header without its parameters.
    fn extract_content_type(headers: &HeaderMap) -> Option<&str> {
        let content_type = headers.get(http::header::CONTENT_TYPE)?.to_str().ok()?;
        bare_media_type(content_type)
    }

    /// Resolves a request path and method to an operation.
    ///
    /// # Examples
    /// ```rust
    /// use oasgate::validator::OpenApiPayloadValidator;
    ///
    /// let validator = OpenApiPayloadValidator::new(serde_json::json!({
    ///     "openapi": "3.1.0",
    ///     "paths": {
    ///         "/pets/{petId}": {
    ///             "get": { "responses": { "200": { "description": "OK" } } }
    ///         }
    ///     }
    /// }))
    /// .unwrap();
    ///
    /// let route = validator.find_route("/pets/7", "GET").unwrap();
    /// assert_eq!(route.path_parameter("petId"), Some("7"));
    /// assert!(validator.find_route("/owners", "GET").is_err());
    /// ```
    pub fn find_route(&self, path: &str, method: &str) -> Result<Arc<RouteMatch>, ValidationErrorType> {
        self.specification
            .find_route(method, path)
            .ok_or_else(|| ValidationErrorType::operation_not_found(method, path))
    }

    /// Validates a whole request: route, then parameters, then body.
    ///
    /// The body is taken as JSON; a `null` body counts as no body. On success
    /// the matched route is returned so callers can dispatch on it.
    pub fn validate_request<T>(
        &self,
        request: &impl HttpLike<T>,
    ) -> Result<Arc<RouteMatch>, ValidationErrorType>
    where
        T: serde::Serialize,
    {
        let route = self.find_route(request.path_ref(), request.method_ref().as_str())?;
        self.validate_request_parameters(&route, request.query_ref(), request.headers_ref())?;

        let body = request.converted_body();
        self.validate_request_body(
            route.operation(),
            Self::extract_content_type(request.headers_ref()),
            body.as_ref(),
        )?;
        Ok(route)
    }

    /// Validates query, path, header and cookie parameters of a matched route.
    ///
    /// # Examples
    /// ```rust
    /// use http::HeaderMap;
    /// use oasgate::validator::OpenApiPayloadValidator;
    ///
    /// let validator = OpenApiPayloadValidator::new(serde_json::json!({
    ///     "openapi": "3.1.0",
    ///     "paths": {
    ///         "/search": {
    ///             "get": {
    ///                 "parameters": [
    ///                     { "name": "filter[tag]", "in": "query", "required": true,
    ///                       "schema": { "type": "string" } },
    ///                     { "name": "limit", "in": "query",
    ///                       "schema": { "type": "integer", "maximum": 10 } }
    ///                 ],
    ///                 "responses": { "200": { "description": "OK" } }
    ///             }
    ///         }
    ///     }
    /// }))
    /// .unwrap();
    ///
    /// let route = validator.find_route("/search", "GET").unwrap();
    /// let headers = HeaderMap::new();
    /// assert!(validator
    ///     .validate_request_parameters(&route, Some("filter[tag]=cats&limit=5"), &headers)
    ///     .is_ok());
    /// assert!(validator
    ///     .validate_request_parameters(&route, Some("limit=50"), &headers)
    ///     .is_err());
    /// ```
    pub fn validate_request_parameters(
        &self,
        route: &RouteMatch,
        query: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<(), ValidationErrorType> {
        let validator = RequestParameterValidator::new(query, route.path_parameters(), headers);
        validator.validate(&self.schemas, route.operation())
    }

    /// Validates a request body against the operation's `requestBody`.
    ///
    /// `content_type` is the bare media type, without parameters.
    pub fn validate_request_body(
        &self,
        operation: &Operation,
        content_type: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(), ValidationErrorType> {
        let validator = RequestBodyValidator::new(body, content_type.and_then(bare_media_type));
        validator.validate(&self.schemas, operation)
    }

    /// Validates a response body against the schema declared for `status`.
    ///
    /// Without a `content_type` the first media type declared for the
    /// response is used. Parameters such as `charset` are ignored.
    /// Responses that declare no schema always pass.
    pub fn validate_response(
        &self,
        operation: &Operation,
        status: u16,
        content_type: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(), ValidationErrorType> {
        let validator = ResponseValidator::new(status, content_type.and_then(bare_media_type), body);
        validator.validate(&self.schemas, operation)
    }
}

/// `application/json; charset=utf-8` -> `application/json`
fn bare_media_type(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .find(|segment| segment.contains('/'))
        .map(str::trim)
}

pub(crate) trait Validator {
    /// Validates one part of an in-flight payload against `operation`.
    ///
    /// # Returns
    /// * `Ok(())` - If the payload part satisfies the operation
    /// * `Err(ValidationErrorType)` - The first failure found
    fn validate(
        &self,
        schemas: &CompiledSchemas,
        operation: &Operation,
    ) -> Result<(), ValidationErrorType>;

    fn section(&self) -> &Section;

    /// Validates `instance` against the schema found at `location`.
    fn complex_validation_by_schema(
        schemas: &CompiledSchemas,
        location: &JsonPath,
        schema: &Value,
        instance: &Value,
        section: Section,
    ) -> Result<(), ValidationErrorType> {
        let validator = schemas.get_or_compile(location, schema)?;
        Self::do_validate(&validator, instance, section)
    }

    fn do_validate(
        validator: &JsonValidator,
        instance: &Value,
        section: Section,
    ) -> Result<(), ValidationErrorType> {
        match validator.validate(instance) {
            Ok(_) => Ok(()),
            Err(e) => Err(ValidationErrorType::schema_validation_failed(&e, section)),
        }
    }
}
