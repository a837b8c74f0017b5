use crate::traverser::{OpenApiTraverser, TraverserError};
use crate::types::ParameterLocation;
use crate::{IN_FIELD, NAME_FIELD, REQUIRED_FIELD, SCHEMA_FIELD};
use serde_json::{Value, json};

/// A single operation parameter as declared in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) location: ParameterLocation,
    pub(crate) required: bool,
    pub(crate) schema: Value,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        schema: Value,
    ) -> Self {
        // path parameters are always required
        let required = required || location == ParameterLocation::Path;
        Self {
            name: name.into(),
            location,
            required,
            schema,
        }
    }

    /// Reads a parameter object. A missing `schema` is the empty schema.
    pub(crate) fn from_value(node: &Value) -> Result<Self, TraverserError> {
        let name = OpenApiTraverser::get_as_str(node, NAME_FIELD)?;
        let location = match node.get(IN_FIELD) {
            None => return Err(TraverserError::missing_field(IN_FIELD)),
            Some(location) => ParameterLocation::try_from(location)?,
        };
        let required = OpenApiTraverser::get_flag(node, REQUIRED_FIELD)?;
        let schema = node.get(SCHEMA_FIELD).cloned().unwrap_or_else(|| json!({}));
        Ok(Self::new(name, location, required, schema))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

#[cfg(test)]
mod test {
    use super::Parameter;
    use crate::traverser::TraverserError;
    use crate::types::ParameterLocation;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        let node = json!({
            "name": "limit",
            "in": "query",
            "required": false,
            "schema": { "type": "integer", "format": "int32" }
        });
        let parameter = Parameter::from_value(&node).unwrap();
        assert_eq!(parameter.name(), "limit");
        assert_eq!(parameter.location(), ParameterLocation::Query);
        assert!(!parameter.is_required());
        assert_eq!(parameter.schema()["format"], "int32");
    }

    #[test]
    fn test_path_parameter_is_always_required() {
        let node = json!({ "name": "petId", "in": "path", "schema": { "type": "string" } });
        let parameter = Parameter::from_value(&node).unwrap();
        assert!(parameter.is_required());
    }

    #[test]
    fn test_missing_schema_is_empty() {
        let node = json!({ "name": "X-Trace", "in": "header" });
        let parameter = Parameter::from_value(&node).unwrap();
        assert_eq!(parameter.schema(), &json!({}));
    }

    #[test]
    fn test_missing_location() {
        let node = json!({ "name": "limit" });
        assert_eq!(
            Parameter::from_value(&node),
            Err(TraverserError::MissingField("in".to_string()))
        );
    }
}
