use crate::traverser::TraverserError;
use crate::types::primitive::OpenApiPrimitives;
use crate::types::version::VersionError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Specification(SpecificationSection),
    Payload(PayloadSection),
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Specification(spec) => write!(f, "Specification --> {}", spec),
            Section::Payload(payload) => write!(f, "Payload --> {}", payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSection {
    Body,
    Header,
    Query,
    Path,
    Cookie,
    Response,
    Other,
}

impl Display for PayloadSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadSection::Body => write!(f, "body"),
            PayloadSection::Header => write!(f, "header"),
            PayloadSection::Query => write!(f, "query"),
            PayloadSection::Path => write!(f, "path"),
            PayloadSection::Cookie => write!(f, "cookie"),
            PayloadSection::Response => write!(f, "response"),
            PayloadSection::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecificationSection {
    Paths(OperationSection),
    Components,
    Other,
}

impl Display for SpecificationSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecificationSection::Paths(operation) => write!(f, "paths --> {}", operation),
            SpecificationSection::Components => write!(f, "components"),
            SpecificationSection::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationSection {
    Parameters,
    RequestBody,
    Responses,
    Other,
}

impl Display for OperationSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationSection::Parameters => write!(f, "parameters"),
            OperationSection::RequestBody => write!(f, "request body"),
            OperationSection::Responses => write!(f, "responses"),
            OperationSection::Other => write!(f, "other"),
        }
    }
}

/// Failures of the response accessors on an operation.
///
/// The `Display` output of both variants is relied upon by consumers and must
/// not change.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseError {
    /// Neither the exact status code nor `default` is defined.
    ResponseCodeNotFound {
        status: u16,
        method: String,
        path: String,
    },

    /// The response defines media types, but not the requested one.
    ResponseMediaTypeNotFound {
        media_type: String,
        method: String,
        path: String,
    },
}

impl ResponseError {
    pub(crate) fn code_not_found(status: u16, method: &str, path: &str) -> Self {
        ResponseError::ResponseCodeNotFound {
            status,
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn media_type_not_found(media_type: &str, method: &str, path: &str) -> Self {
        ResponseError::ResponseMediaTypeNotFound {
            media_type: media_type.to_string(),
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

impl Display for ResponseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::ResponseCodeNotFound {
                status,
                method,
                path,
            } => write!(
                f,
                "Response status code or default not found: {} for '{} {}'",
                status, method, path
            ),
            ResponseError::ResponseMediaTypeNotFound {
                media_type,
                method,
                path,
            } => write!(
                f,
                "Response media type found: '{}' for '{} {}'",
                media_type, method, path
            ),
        }
    }
}

impl std::error::Error for ResponseError {}

/// Errors raised while loading a document and building its operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecificationError {
    LoadFailed(String),
    UnableToParse(String),
    UnsupportedVersion(String),
    FieldExpected(String, Section),
    UnexpectedType {
        expected: OpenApiPrimitives,
        found: String,
        section: Section,
    },
    InvalidRef(String),
    ParameterConflict {
        name: String,
        operation: String,
    },
}

impl SpecificationError {
    pub(crate) fn traversal_failed(error: TraverserError, section: Section) -> Self {
        match error {
            TraverserError::MissingField(field) => SpecificationError::FieldExpected(field, section),
            TraverserError::TypeMismatch { expected, found } => {
                SpecificationError::UnexpectedType {
                    expected,
                    found,
                    section,
                }
            }
            TraverserError::InvalidRef(reference) => SpecificationError::InvalidRef(reference),
        }
    }

    pub(crate) fn parameter_conflict<T>(name: &T, operation: &T) -> Self
    where
        T: ToString + ?Sized,
    {
        SpecificationError::ParameterConflict {
            name: name.to_string(),
            operation: operation.to_string(),
        }
    }
}

impl From<VersionError> for SpecificationError {
    fn from(value: VersionError) -> Self {
        match value {
            VersionError::UnsupportedVersion(version) => {
                SpecificationError::UnsupportedVersion(version)
            }
        }
    }
}

impl Display for SpecificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecificationError::LoadFailed(msg) => write!(f, "Loading specification failed: {}", msg),
            SpecificationError::UnableToParse(msg) => {
                write!(f, "Unable to parse specification: {}", msg)
            }
            SpecificationError::UnsupportedVersion(version) => {
                write!(f, "Unsupported OpenAPI version: {}", version)
            }
            SpecificationError::FieldExpected(field, section) => {
                write!(f, "Field {} expected in {}", field, section)
            }
            SpecificationError::UnexpectedType {
                expected,
                found,
                section,
            } => write!(f, "Expected {} but found {} in {}", expected, found, section),
            SpecificationError::InvalidRef(reference) => write!(f, "Invalid ref {}", reference),
            SpecificationError::ParameterConflict { name, operation } => write!(
                f,
                "Parameter '{}' is used both as a scalar and as a nested object in '{}'",
                name, operation
            ),
        }
    }
}

impl std::error::Error for SpecificationError {}

/// Errors raised while validating an in-flight request or response.
#[derive(Debug)]
pub enum ValidationErrorType {
    OperationNotFound { method: String, path: String },
    SectionExpected(Section),
    FieldExpected(String, Section),
    ValueExpected(String, Section),
    SchemaValidationFailed(String, Section),
    UnableToParse(String, Section),
    Response(ResponseError),
}

impl ValidationErrorType {
    pub(crate) fn operation_not_found(method: &str, path: &str) -> Self {
        ValidationErrorType::OperationNotFound {
            method: method.to_uppercase(),
            path: path.to_string(),
        }
    }

    pub(crate) fn schema_validation_failed<T>(message: &T, section: Section) -> Self
    where
        T: ToString + ?Sized,
    {
        ValidationErrorType::SchemaValidationFailed(message.to_string(), section)
    }

    /// Returns the section of the payload or document the error points at, if any.
    pub fn section(&self) -> Option<&Section> {
        match self {
            ValidationErrorType::SectionExpected(section)
            | ValidationErrorType::FieldExpected(_, section)
            | ValidationErrorType::ValueExpected(_, section)
            | ValidationErrorType::SchemaValidationFailed(_, section)
            | ValidationErrorType::UnableToParse(_, section) => Some(section),
            ValidationErrorType::OperationNotFound { .. } | ValidationErrorType::Response(_) => {
                None
            }
        }
    }
}

impl From<ResponseError> for ValidationErrorType {
    fn from(value: ResponseError) -> Self {
        ValidationErrorType::Response(value)
    }
}

impl Display for ValidationErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorType::OperationNotFound { method, path } => {
                write!(f, "No operation found for '{} {}'", method, path)
            }
            ValidationErrorType::SectionExpected(section) => {
                write!(f, "Section {} expected", section)
            }
            ValidationErrorType::FieldExpected(field, section) => {
                write!(f, "Field {} expected in {}", field, section)
            }
            ValidationErrorType::ValueExpected(msg, section) => {
                write!(f, "Value expected {} in {}", msg, section)
            }
            ValidationErrorType::SchemaValidationFailed(msg, section) => {
                write!(f, "Schema Validation Failed in {}: {}", section, msg)
            }
            ValidationErrorType::UnableToParse(msg, section) => {
                write!(f, "Unable to parse {} in {}", msg, section)
            }
            ValidationErrorType::Response(error) => write!(f, "{}", error),
        }
    }
}

impl PartialEq for ValidationErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ValidationErrorType::OperationNotFound { .. },
                ValidationErrorType::OperationNotFound { .. },
            ) => true,
            (ValidationErrorType::SectionExpected(_), ValidationErrorType::SectionExpected(_)) => {
                true
            }
            (
                ValidationErrorType::FieldExpected(_, _),
                ValidationErrorType::FieldExpected(_, _),
            ) => true,
            (
                ValidationErrorType::ValueExpected(_, _),
                ValidationErrorType::ValueExpected(_, _),
            ) => true,
            (
                ValidationErrorType::SchemaValidationFailed(_, _),
                ValidationErrorType::SchemaValidationFailed(_, _),
            ) => true,
            (
                ValidationErrorType::UnableToParse(_, _),
                ValidationErrorType::UnableToParse(_, _),
            ) => true,
            (ValidationErrorType::Response(left), ValidationErrorType::Response(right)) => {
                left == right
            }
            (_, _) => false,
        }
    }
}

impl std::error::Error for ValidationErrorType {}
