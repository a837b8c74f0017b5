use crate::OPENAPI_FIELD;
use jsonschema::Draft;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiVersion {
    V30x,
    V31x,
}

impl FromStr for OpenApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("3.1") {
            Ok(OpenApiVersion::V31x)
        } else if s.starts_with("3.0") {
            Ok(OpenApiVersion::V30x)
        } else {
            Err(VersionError::unsupported_version(s))
        }
    }
}

impl Display for OpenApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenApiVersion::V30x => write!(f, "3.0.x"),
            OpenApiVersion::V31x => write!(f, "3.1.x"),
        }
    }
}

impl OpenApiVersion {
    /// Reads the `openapi` field of a document.
    pub(crate) fn from_document(document: &Value) -> Result<Self, VersionError> {
        match document.get(OPENAPI_FIELD).and_then(Value::as_str) {
            Some(version) => OpenApiVersion::from_str(version),
            None => Err(VersionError::unsupported_version("<missing>")),
        }
    }

    /// 3.0 schemas are a Draft 4 dialect, 3.1 schemas are plain 2020-12.
    pub(crate) fn get_draft(&self) -> Draft {
        match self {
            OpenApiVersion::V30x => Draft::Draft4,
            OpenApiVersion::V31x => Draft::Draft202012,
        }
    }
}

#[derive(Debug)]
pub enum VersionError {
    UnsupportedVersion(String),
}

impl VersionError {
    pub(crate) fn unsupported_version<T>(version: &T) -> Self
    where
        T: ToString + ?Sized,
    {
        VersionError::UnsupportedVersion(version.to_string())
    }
}

impl Display for VersionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionError::UnsupportedVersion(version) => {
                write!(f, "Unsupported version: {}", version)
            }
        }
    }
}

impl std::error::Error for VersionError {}
