pub mod cache;
pub mod converter;
pub mod error;
pub mod loader;
pub mod operation;
pub mod specification;
pub mod traverser;
pub mod types;
pub mod validator;

pub use crate::error::{ResponseError, SpecificationError, ValidationErrorType};
pub use crate::operation::{Operation, ResponseLookup};
pub use crate::specification::{RouteMatch, Specification};
pub use crate::validator::OpenApiPayloadValidator;

pub(crate) const CONTENT_FIELD: &str = "content";
pub(crate) const SCHEMA_FIELD: &str = "schema";
pub(crate) const REQUEST_BODY_FIELD: &str = "requestBody";
pub(crate) const RESPONSES_FIELD: &str = "responses";
pub(crate) const DEFAULT_FIELD: &str = "default";
pub(crate) const PATHS_FIELD: &str = "paths";
pub(crate) const PARAMETERS_FIELD: &str = "parameters";
pub(crate) const PROPERTIES_FIELD: &str = "properties";
pub(crate) const OPERATION_ID_FIELD: &str = "operationId";
pub(crate) const REF_FIELD: &str = "$ref";
pub(crate) const TYPE_FIELD: &str = "type";
pub(crate) const ITEMS_FIELD: &str = "items";
pub(crate) const NAME_FIELD: &str = "name";
pub(crate) const OPENAPI_FIELD: &str = "openapi";
pub(crate) const REQUIRED_FIELD: &str = "required";
pub(crate) const IN_FIELD: &str = "in";
pub(crate) const PATH_SEPARATOR: &str = "/";
pub(crate) const TILDE: &str = "~";
pub(crate) const ENCODED_BACKSLASH: &str = "~1";
pub(crate) const ENCODED_TILDE: &str = "~0";

/// Identifier under which the loaded document is registered with the JSON
/// Schema engine. Cyclic references left by the loader point at it.
pub const DEFAULT_ROOT_ID: &str = "urn:oasgate:root";

/// Path item keys that hold operations.
pub(crate) const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];
