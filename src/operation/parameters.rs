//! Folds an operation's query and path parameters into one JSON Schema.
//!
//! Bracketed names (`filter[tag]`) become nested object schemas, so the
//! resulting schema validates the same nested map a query string parser
//! produces for `?filter[tag]=cat`.

use crate::error::SpecificationError;
use crate::types::parameter::Parameter;
use crate::types::primitive::OpenApiPrimitives;
use crate::{PROPERTIES_FIELD, REQUIRED_FIELD, TYPE_FIELD};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

/// Options applied while deriving the parameters schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterSchemaOptions {
    /// When set, an object holding a required nested field is itself
    /// required in its parent. Off by default: a parent is only required
    /// when a flat parameter of the same name is.
    pub require_nested_parents: bool,
}

enum SchemaNode {
    Leaf(Value),
    Object(ObjectNode),
}

impl SchemaNode {
    fn into_value(self) -> Value {
        match self {
            SchemaNode::Leaf(schema) => schema,
            SchemaNode::Object(node) => node.into_value(),
        }
    }
}

#[derive(Default)]
struct ObjectNode {
    /// Schema of a flat parameter sharing the object's name.
    base: Map<String, Value>,
    properties: IndexMap<String, SchemaNode>,
    required: Vec<String>,
}

/// Context used for conflict reporting.
struct FoldContext<'a> {
    options: ParameterSchemaOptions,
    parameter: &'a str,
    operation: &'a str,
}

impl ObjectNode {
    fn from_base(schema: &Value, context: &FoldContext) -> Result<Self, SpecificationError> {
        let mut node = ObjectNode::default();
        node.set_base(schema, context)?;
        Ok(node)
    }

    fn set_base(&mut self, schema: &Value, context: &FoldContext) -> Result<(), SpecificationError> {
        match OpenApiPrimitives::from_schema(schema) {
            None | Some(OpenApiPrimitives::Object) => {
                self.base = schema.as_object().cloned().unwrap_or_default();
                Ok(())
            }
            Some(_) => Err(SpecificationError::parameter_conflict(
                context.parameter,
                context.operation,
            )),
        }
    }

    fn require(&mut self, key: &str) {
        if !self.required.iter().any(|required| required == key) {
            self.required.push(key.to_string());
        }
    }

    /// Returns the object stored under `key`, turning a flat schema into the
    /// object's base when needed.
    fn object_entry(
        &mut self,
        key: &str,
        context: &FoldContext,
    ) -> Result<&mut ObjectNode, SpecificationError> {
        let entry = self
            .properties
            .entry(key.to_string())
            .or_insert_with(|| SchemaNode::Object(ObjectNode::default()));

        if let SchemaNode::Leaf(schema) = entry {
            let node = ObjectNode::from_base(schema, context)?;
            *entry = SchemaNode::Object(node);
        }

        match entry {
            SchemaNode::Object(node) => Ok(node),
            SchemaNode::Leaf(_) => Err(SpecificationError::parameter_conflict(
                context.parameter,
                context.operation,
            )),
        }
    }

    fn insert(
        &mut self,
        keys: &[&str],
        schema: &Value,
        required: bool,
        context: &FoldContext,
    ) -> Result<(), SpecificationError> {
        let Some((key, rest)) = keys.split_first() else {
            return Ok(());
        };

        let promote = if rest.is_empty() {
            match self.properties.get_mut(*key) {
                Some(SchemaNode::Object(node)) => node.set_base(schema, context)?,
                _ => {
                    self.properties
                        .insert(key.to_string(), SchemaNode::Leaf(schema.clone()));
                }
            }
            required
        } else {
            self.object_entry(key, context)?
                .insert(rest, schema, required, context)?;
            required && context.options.require_nested_parents
        };

        if promote {
            self.require(key);
        }
        Ok(())
    }

    fn into_value(self) -> Value {
        let mut schema = self.base;
        schema.insert(TYPE_FIELD.to_string(), json!("object"));

        let mut properties = match schema.remove(PROPERTIES_FIELD) {
            Some(Value::Object(properties)) => properties,
            _ => Map::new(),
        };
        for (key, node) in self.properties {
            properties.insert(key, node.into_value());
        }
        schema.insert(PROPERTIES_FIELD.to_string(), Value::Object(properties));

        let mut required = match schema.remove(REQUIRED_FIELD) {
            Some(Value::Array(required)) => required,
            _ => Vec::new(),
        };
        for key in self.required {
            let key = Value::String(key);
            if !required.contains(&key) {
                required.push(key);
            }
        }
        if !required.is_empty() {
            schema.insert(REQUIRED_FIELD.to_string(), Value::Array(required));
        }

        Value::Object(schema)
    }
}

/// Splits `head[a][b]` into `["head", "a", "b"]`.
///
/// Anything that is not a head followed by non-empty bracketed keys is
/// returned whole as a flat name.
pub(crate) fn split_nested_name(name: &str) -> Vec<&str> {
    let Some(open) = name.find('[') else {
        return vec![name];
    };
    let head = &name[..open];
    if head.is_empty() {
        return vec![name];
    }

    let mut keys = vec![head];
    let mut rest = &name[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![name];
        };
        let Some(close) = inner.find(']') else {
            return vec![name];
        };
        let key = &inner[..close];
        if key.is_empty() || key.contains('[') {
            return vec![name];
        }
        keys.push(key);
        rest = &inner[close + 1..];
    }
    keys
}

/// Builds the parameters schema for `operation` (used in error messages).
///
/// Only query and path parameters take part. Without any, the result is
/// `{"type": "object"}`.
pub(crate) fn build_parameters_schema(
    parameters: &[Parameter],
    options: ParameterSchemaOptions,
    operation: &str,
) -> Result<Value, SpecificationError> {
    let mut root = ObjectNode::default();
    for parameter in parameters
        .iter()
        .filter(|parameter| parameter.location().is_schema_location())
    {
        let context = FoldContext {
            options,
            parameter: parameter.name(),
            operation,
        };
        let keys = split_nested_name(parameter.name());
        root.insert(&keys, parameter.schema(), parameter.is_required(), &context)?;
    }

    if root.properties.is_empty() {
        return Ok(json!({ TYPE_FIELD: "object" }));
    }
    Ok(root.into_value())
}

#[cfg(test)]
mod test {
    use super::{ParameterSchemaOptions, build_parameters_schema, split_nested_name};
    use crate::error::SpecificationError;
    use crate::types::ParameterLocation;
    use crate::types::parameter::Parameter;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn query(name: &str, required: bool, schema: serde_json::Value) -> Parameter {
        Parameter::new(name, ParameterLocation::Query, required, schema)
    }

    fn build(parameters: &[Parameter]) -> serde_json::Value {
        build_parameters_schema(parameters, ParameterSchemaOptions::default(), "GET /test").unwrap()
    }

    #[test]
    fn test_split_nested_name() {
        assert_eq!(split_nested_name("term"), vec!["term"]);
        assert_eq!(split_nested_name("filter[tag]"), vec!["filter", "tag"]);
        assert_eq!(split_nested_name("a[b][c]"), vec!["a", "b", "c"]);
        assert_eq!(split_nested_name("a[b"), vec!["a[b"]);
        assert_eq!(split_nested_name("[b]"), vec!["[b]"]);
        assert_eq!(split_nested_name("ids[]"), vec!["ids[]"]);
        assert_eq!(split_nested_name("a[b]c"), vec!["a[b]c"]);
    }

    #[test]
    fn test_no_parameters() {
        assert_eq!(build(&[]), json!({"type": "object"}));
    }

    #[test]
    fn test_header_and_cookie_parameters_are_excluded() {
        let parameters = vec![
            Parameter::new("X-Request-Id", ParameterLocation::Header, true, json!({"type": "string"})),
            Parameter::new("session", ParameterLocation::Cookie, true, json!({"type": "string"})),
        ];
        assert_eq!(build(&parameters), json!({"type": "object"}));
    }

    #[test]
    fn test_flat_parameters() {
        let parameters = vec![
            Parameter::new("petId", ParameterLocation::Path, true, json!({"type": "string"})),
            query("limit", false, json!({"type": "integer"})),
        ];
        let schema = build(&parameters);
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "petId": {"type": "string"},
                    "limit": {"type": "integer"}
                },
                "required": ["petId"]
            })
        );
    }

    #[test]
    fn test_nested_parameters_do_not_require_parent() {
        let parameters = vec![
            query("term", true, json!({"type": "string"})),
            query("filter[tag]", true, json!({"type": "string"})),
            query("filter[other]", false, json!({"type": "object"})),
        ];
        assert_eq!(
            build(&parameters),
            json!({
                "type": "object",
                "required": ["term"],
                "properties": {
                    "term": {"type": "string"},
                    "filter": {
                        "type": "object",
                        "required": ["tag"],
                        "properties": {
                            "tag": {"type": "string"},
                            "other": {"type": "object"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_nested_parameters_require_parent_when_configured() {
        let parameters = vec![
            query("filter[tag]", true, json!({"type": "string"})),
            query("page[size]", false, json!({"type": "integer"})),
        ];
        let options = ParameterSchemaOptions {
            require_nested_parents: true,
        };
        let schema = build_parameters_schema(&parameters, options, "GET /test").unwrap();
        assert_eq!(schema["required"], json!(["filter"]));
        assert!(schema["properties"]["page"].get("required").is_none());
    }

    #[test]
    fn test_flat_object_merges_with_nested_keys() {
        // Flat declaration first, then nested keys.
        let parameters = vec![
            query("filter", true, json!({"type": "object"})),
            query("filter[tag]", true, json!({"type": "string"})),
            query("filter[id]", true, json!({"type": "integer"})),
        ];
        let expected = json!({
            "type": "object",
            "required": ["filter"],
            "properties": {
                "filter": {
                    "type": "object",
                    "required": ["tag", "id"],
                    "properties": {
                        "tag": {"type": "string"},
                        "id": {"type": "integer"}
                    }
                }
            }
        });
        assert_eq!(build(&parameters), expected);

        // Nested keys first, then the flat declaration.
        let parameters = vec![
            query("filter[tag]", true, json!({"type": "string"})),
            query("filter[id]", true, json!({"type": "integer"})),
            query("filter", true, json!({"type": "object"})),
        ];
        assert_eq!(build(&parameters), expected);
    }

    #[test]
    fn test_flat_object_keeps_its_own_properties() {
        let parameters = vec![
            query(
                "filter",
                false,
                json!({
                    "type": "object",
                    "description": "filters",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }),
            ),
            query("filter[tag]", true, json!({"type": "string"})),
        ];
        let schema = build(&parameters);
        assert_eq!(
            schema["properties"]["filter"],
            json!({
                "type": "object",
                "description": "filters",
                "properties": {
                    "name": {"type": "string"},
                    "tag": {"type": "string"}
                },
                "required": ["name", "tag"]
            })
        );
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn test_deeply_nested_parameters() {
        let parameters = vec![query("a[b][c]", true, json!({"type": "integer"}))];
        assert_eq!(
            build(&parameters),
            json!({
                "type": "object",
                "properties": {
                    "a": {
                        "type": "object",
                        "properties": {
                            "b": {
                                "type": "object",
                                "required": ["c"],
                                "properties": {"c": {"type": "integer"}}
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_scalar_and_nested_conflict() {
        let parameters = vec![
            query("filter", false, json!({"type": "string"})),
            query("filter[tag]", false, json!({"type": "string"})),
        ];
        let result =
            build_parameters_schema(&parameters, ParameterSchemaOptions::default(), "GET /pets");
        assert_eq!(
            result,
            Err(SpecificationError::ParameterConflict {
                name: "filter[tag]".to_string(),
                operation: "GET /pets".to_string()
            })
        );

        let parameters = vec![
            query("filter[tag]", false, json!({"type": "string"})),
            query("filter", false, json!({"type": "integer"})),
        ];
        let result =
            build_parameters_schema(&parameters, ParameterSchemaOptions::default(), "GET /pets");
        assert!(matches!(
            result,
            Err(SpecificationError::ParameterConflict { .. })
        ));
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let parameters = vec![
            query("term", true, json!({"type": "string"})),
            query("filter[tag]", true, json!({"type": "string"})),
            query("limit", false, json!({"type": "integer", "format": "int32"})),
        ];
        let first = serde_json::to_string(&build(&parameters)).unwrap();
        let second = serde_json::to_string(&build(&parameters)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            r#"{"type":"object","properties":{"term":{"type":"string"},"filter":{"type":"object","properties":{"tag":{"type":"string"}},"required":["tag"]},"limit":{"type":"integer","format":"int32"}},"required":["term"]}"#
        );
    }
}
