pub mod json_path;
pub mod parameter;
pub mod primitive;
pub mod version;

use crate::traverser::TraverserError;
use crate::types::primitive::OpenApiPrimitives;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ParameterLocation {
    Header,
    Query,
    Cookie,
    Path,
}

impl ParameterLocation {
    /// Query and path parameters make up the derived parameters schema.
    pub fn is_schema_location(&self) -> bool {
        matches!(self, ParameterLocation::Query | ParameterLocation::Path)
    }
}

impl Display for ParameterLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ParameterLocation::Header => "header",
            ParameterLocation::Query => "query",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Path => "path",
        };
        write!(f, "{}", str)
    }
}

impl FromStr for ParameterLocation {
    type Err = TraverserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" => Ok(ParameterLocation::Header),
            "query" => Ok(ParameterLocation::Query),
            "cookie" => Ok(ParameterLocation::Cookie),
            "path" => Ok(ParameterLocation::Path),
            _ => Err(TraverserError::TypeMismatch {
                expected: OpenApiPrimitives::String,
                found: format!("parameter location '{}'", s),
            }),
        }
    }
}

impl TryFrom<&Value> for ParameterLocation {
    type Error = TraverserError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(location) => ParameterLocation::from_str(location),
            None => Err(TraverserError::type_mismatch(OpenApiPrimitives::String, value)),
        }
    }
}
