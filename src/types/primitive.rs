use crate::{ITEMS_FIELD, PROPERTIES_FIELD, TYPE_FIELD};
use serde_json::{Map, Number, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum OpenApiPrimitives {
    Null,
    Bool,
    Integer,
    Array,
    Number,
    String,
    Object,
}

impl Display for OpenApiPrimitives {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenApiPrimitives::Null => write!(f, "null"),
            OpenApiPrimitives::Bool => write!(f, "boolean"),
            OpenApiPrimitives::Integer => write!(f, "integer"),
            OpenApiPrimitives::Array => write!(f, "array"),
            OpenApiPrimitives::Number => write!(f, "number"),
            OpenApiPrimitives::String => write!(f, "string"),
            OpenApiPrimitives::Object => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownPrimitive(pub String);

impl Display for UnknownPrimitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown schema type: {}", self.0)
    }
}

impl std::error::Error for UnknownPrimitive {}

impl FromStr for OpenApiPrimitives {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "null" => Ok(OpenApiPrimitives::Null),
            "bool" | "boolean" => Ok(OpenApiPrimitives::Bool),
            "integer" => Ok(OpenApiPrimitives::Integer),
            "number" => Ok(OpenApiPrimitives::Number),
            "string" => Ok(OpenApiPrimitives::String),
            "array" => Ok(OpenApiPrimitives::Array),
            "object" => Ok(OpenApiPrimitives::Object),
            other => Err(UnknownPrimitive(other.to_string())),
        }
    }
}

impl OpenApiPrimitives {
    pub fn get_type_from_serde(value: &Value) -> OpenApiPrimitives {
        match value {
            Value::Null => OpenApiPrimitives::Null,
            Value::Bool(_) => OpenApiPrimitives::Bool,
            Value::Number(number) if number.is_f64() => OpenApiPrimitives::Number,
            Value::Number(_) => OpenApiPrimitives::Integer,
            Value::String(_) => OpenApiPrimitives::String,
            Value::Array(_) => OpenApiPrimitives::Array,
            Value::Object(_) => OpenApiPrimitives::Object,
        }
    }

    /// Reads the declared `type` of a schema.
    ///
    /// For a type list (`["string", "null"]`) the first non-null entry wins.
    pub fn from_schema(schema: &Value) -> Option<OpenApiPrimitives> {
        match schema.get(TYPE_FIELD)? {
            Value::String(type_name) => OpenApiPrimitives::from_str(type_name).ok(),
            Value::Array(type_names) => type_names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|type_name| OpenApiPrimitives::from_str(type_name).ok())
                .find(|primitive| *primitive != OpenApiPrimitives::Null),
            _ => None,
        }
    }

    /// Converts a raw string into a JSON value of this type.
    ///
    /// Returns `None` when the string cannot represent the type, or for
    /// container types which need the schema to convert.
    pub fn convert_value_to_type(&self, input: &str) -> Option<Value> {
        match self {
            OpenApiPrimitives::Null => match input {
                "" | "null" => Some(Value::Null),
                _ => None,
            },
            OpenApiPrimitives::Bool => input.parse::<bool>().ok().map(Value::Bool),
            OpenApiPrimitives::Integer => input.parse::<i64>().ok().map(Value::from),
            OpenApiPrimitives::Number => input
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            OpenApiPrimitives::String => Some(Value::String(input.to_string())),
            OpenApiPrimitives::Array | OpenApiPrimitives::Object => None,
        }
    }

    /// Coerces string leaves of a raw request value towards what `schema` declares.
    ///
    /// Values that do not convert are kept as they are so schema validation
    /// reports them against the declared type.
    pub fn coerce(schema: &Value, value: &Value) -> Value {
        match value {
            Value::String(raw) => match OpenApiPrimitives::from_schema(schema) {
                Some(OpenApiPrimitives::Array) => {
                    let items = schema.get(ITEMS_FIELD).unwrap_or(&Value::Null);
                    let coerced = raw
                        .split(',')
                        .map(|item| Self::coerce(items, &Value::String(item.to_string())))
                        .collect();
                    Value::Array(coerced)
                }
                Some(primitive) => primitive
                    .convert_value_to_type(raw)
                    .unwrap_or_else(|| value.clone()),
                None => value.clone(),
            },
            Value::Array(values) => {
                let items = match OpenApiPrimitives::from_schema(schema) {
                    Some(OpenApiPrimitives::Array) => schema.get(ITEMS_FIELD).unwrap_or(&Value::Null),
                    _ => return value.clone(),
                };
                Value::Array(values.iter().map(|item| Self::coerce(items, item)).collect())
            }
            Value::Object(fields) => {
                let properties = schema.get(PROPERTIES_FIELD);
                let coerced: Map<String, Value> = fields
                    .iter()
                    .map(|(key, field)| {
                        let field_schema = properties
                            .and_then(|properties| properties.get(key))
                            .unwrap_or(&Value::Null);
                        (key.clone(), Self::coerce(field_schema, field))
                    })
                    .collect();
                Value::Object(coerced)
            }
            _ => value.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::OpenApiPrimitives;
    use serde_json::json;

    #[test]
    fn test_from_schema() {
        assert_eq!(
            OpenApiPrimitives::from_schema(&json!({"type": "integer"})),
            Some(OpenApiPrimitives::Integer)
        );
        assert_eq!(
            OpenApiPrimitives::from_schema(&json!({"type": ["null", "boolean"]})),
            Some(OpenApiPrimitives::Bool)
        );
        assert_eq!(OpenApiPrimitives::from_schema(&json!({})), None);
    }

    #[test]
    fn test_convert_value_to_type() {
        assert_eq!(
            OpenApiPrimitives::Integer.convert_value_to_type("42"),
            Some(json!(42))
        );
        assert_eq!(OpenApiPrimitives::Integer.convert_value_to_type("4.2"), None);
        assert_eq!(
            OpenApiPrimitives::Number.convert_value_to_type("4.5"),
            Some(json!(4.5))
        );
        assert_eq!(
            OpenApiPrimitives::Bool.convert_value_to_type("true"),
            Some(json!(true))
        );
        assert_eq!(OpenApiPrimitives::Object.convert_value_to_type("{}"), None);
    }

    #[test]
    fn test_coerce_nested_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "limit": { "type": "integer" },
                "ids": { "type": "array", "items": { "type": "integer" } },
                "filter": {
                    "type": "object",
                    "properties": {
                        "active": { "type": "boolean" },
                        "tag": { "type": "string" }
                    }
                }
            }
        });
        let raw = json!({
            "limit": "10",
            "ids": "1,2,3",
            "filter": { "active": "false", "tag": "cat" },
            "unknown": "7"
        });
        assert_eq!(
            OpenApiPrimitives::coerce(&schema, &raw),
            json!({
                "limit": 10,
                "ids": [1, 2, 3],
                "filter": { "active": false, "tag": "cat" },
                "unknown": "7"
            })
        );
    }

    #[test]
    fn test_coerce_keeps_unparsable_values() {
        let schema = json!({ "type": "integer" });
        assert_eq!(
            OpenApiPrimitives::coerce(&schema, &json!("ten")),
            json!("ten")
        );
    }

    #[test]
    fn test_coerce_repeated_values() {
        let schema = json!({ "type": "array", "items": { "type": "number" } });
        assert_eq!(
            OpenApiPrimitives::coerce(&schema, &json!(["1.5", "2"])),
            json!([1.5, 2.0])
        );
    }
}
