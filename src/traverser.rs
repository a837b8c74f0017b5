use crate::types::primitive::OpenApiPrimitives;
use crate::REF_FIELD;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

type TraverseTypeResult<'a, T> = Result<&'a T, TraverserError>;
type TraverseResult = Result<(), TraverserError>;

/// Error types that can occur while reading nodes of an OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub enum TraverserError {
    /// A required field was not found in the node.
    MissingField(String),

    /// The found type does not match the expected type.
    TypeMismatch {
        expected: OpenApiPrimitives,
        found: String,
    },

    /// A local reference points at a location that does not exist.
    InvalidRef(String),
}

impl TraverserError {
    #[inline]
    pub(crate) fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    #[inline]
    pub(crate) fn type_mismatch(expected: OpenApiPrimitives, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: OpenApiPrimitives::get_type_from_serde(found).to_string(),
        }
    }

    #[inline]
    pub(crate) fn invalid_ref(reference: impl Into<String>) -> Self {
        Self::InvalidRef(reference.into())
    }
}

impl Display for TraverserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TraverserError::MissingField(field) => {
                write!(f, "Missing field: {}", field)
            }
            TraverserError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            TraverserError::InvalidRef(reference) => {
                write!(f, "Invalid reference: {}", reference)
            }
        }
    }
}

impl std::error::Error for TraverserError {}

/// Typed access to document nodes and local reference expansion.
pub struct OpenApiTraverser;

impl OpenApiTraverser {
    /// Replaces every local `$ref` in the document with a copy of its target.
    ///
    /// # Parameters
    /// - `document`: The document to rewrite in place
    /// - `root_id`: The identifier the document is registered under with the schema engine
    ///
    /// # Behavior
    /// A reference whose target is already being expanded further up the
    /// tree (a recursive schema) cannot be inlined. It is kept and rewritten to
    /// `<root_id>#/...` so a validator with the document registered as a
    /// resource can still follow it. Non-local references are left untouched.
    pub fn dereference(document: &mut Value, root_id: &str) -> TraverseResult {
        let source = document.clone();
        let mut expanding = Vec::new();
        Self::expand_node(&source, document, &mut expanding, root_id)
    }

    fn expand_node(
        source: &Value,
        node: &mut Value,
        expanding: &mut Vec<String>,
        root_id: &str,
    ) -> TraverseResult {
        match node {
            Value::Object(map) => {
                if let Some(reference) = map.get(REF_FIELD).and_then(Value::as_str) {
                    let reference = reference.to_string();
                    if reference.starts_with(root_id) {
                        // already rewritten by an earlier pass
                        return Ok(());
                    }
                    let Some(fragment) = reference.strip_prefix('#') else {
                        log::warn!("Leaving non-local reference {} unresolved", reference);
                        return Ok(());
                    };

                    if expanding.contains(&reference) {
                        log::debug!("Keeping recursive reference {}", reference);
                        map.insert(
                            REF_FIELD.to_string(),
                            Value::String(format!("{}{}", root_id, reference)),
                        );
                        return Ok(());
                    }

                    let pointer = percent_encoding::percent_decode_str(fragment)
                        .decode_utf8_lossy()
                        .to_string();
                    let mut resolved = match source.pointer(&pointer) {
                        None => return Err(TraverserError::invalid_ref(reference)),
                        Some(target) => target.clone(),
                    };

                    expanding.push(reference);
                    Self::expand_node(source, &mut resolved, expanding, root_id)?;
                    expanding.pop();
                    *node = resolved;
                    return Ok(());
                }

                for value in map.values_mut() {
                    Self::expand_node(source, value, expanding, root_id)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    Self::expand_node(source, item, expanding, root_id)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Generic helper for extracting typed values from JSON nodes.
    fn get_as_type<'n, T, F>(node: &'n Value, field: &str, converter: F) -> TraverseTypeResult<'n, T>
    where
        T: ?Sized,
        F: Fn(&'n Value) -> TraverseTypeResult<'n, T>,
    {
        match node.get(field) {
            None => Err(TraverserError::missing_field(field)),
            Some(found) => converter(found),
        }
    }

    /// Like [`Self::get_as_type`], but a missing field is `Ok(None)`.
    fn get_optional_type<'n, T, F>(
        node: &'n Value,
        field: &str,
        converter: F,
    ) -> Result<Option<&'n T>, TraverserError>
    where
        T: ?Sized,
        F: Fn(&'n Value) -> TraverseTypeResult<'n, T>,
    {
        match node.get(field) {
            None => Ok(None),
            Some(found) => converter(found).map(Some),
        }
    }

    fn require_type<'n, T, F>(
        node: &'n Value,
        converter: F,
        expected: OpenApiPrimitives,
    ) -> Result<T, TraverserError>
    where
        F: Fn(&'n Value) -> Option<T>,
    {
        converter(node).ok_or_else(|| TraverserError::type_mismatch(expected, node))
    }

    pub(crate) fn get_as_str<'n>(node: &'n Value, field: &str) -> TraverseTypeResult<'n, str> {
        Self::get_as_type(node, field, Self::require_str)
    }

    pub(crate) fn get_optional_str<'n>(
        node: &'n Value,
        field: &str,
    ) -> Result<Option<&'n str>, TraverserError> {
        Self::get_optional_type(node, field, Self::require_str)
    }

    pub(crate) fn get_optional_array<'n>(
        node: &'n Value,
        field: &str,
    ) -> Result<Option<&'n Vec<Value>>, TraverserError> {
        Self::get_optional_type(node, field, Self::require_array)
    }

    /// A missing flag is `false`.
    pub(crate) fn get_flag(node: &Value, field: &str) -> Result<bool, TraverserError> {
        match node.get(field) {
            None => Ok(false),
            Some(found) => Self::require_bool(found),
        }
    }

    pub(crate) fn require_bool(node: &Value) -> Result<bool, TraverserError> {
        Self::require_type(node, Value::as_bool, OpenApiPrimitives::Bool)
    }

    pub(crate) fn require_str(node: &Value) -> TraverseTypeResult<'_, str> {
        Self::require_type(node, Value::as_str, OpenApiPrimitives::String)
    }

    pub(crate) fn require_object(node: &Value) -> TraverseTypeResult<'_, Map<String, Value>> {
        Self::require_type(node, Value::as_object, OpenApiPrimitives::Object)
    }

    pub(crate) fn require_array(node: &Value) -> TraverseTypeResult<'_, Vec<Value>> {
        Self::require_type(node, Value::as_array, OpenApiPrimitives::Array)
    }
}
