use crate::PARAMETERS_FIELD;
use crate::error::{PayloadSection, Section, ValidationErrorType};
use crate::operation::Operation;
use crate::operation::parameters::split_nested_name;
use crate::types::ParameterLocation;
use crate::types::parameter::Parameter;
use crate::types::primitive::OpenApiPrimitives;
use crate::validator::{CompiledSchemas, Validator};
use http::HeaderMap;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Validates query, path, header and cookie parameters of one request.
pub(crate) struct RequestParameterValidator<'a> {
    query: Option<&'a str>,
    path_parameters: &'a IndexMap<String, String>,
    headers: &'a HeaderMap,
    section: Section,
}

impl<'a> RequestParameterValidator<'a> {
    pub(crate) fn new(
        query: Option<&'a str>,
        path_parameters: &'a IndexMap<String, String>,
        headers: &'a HeaderMap,
    ) -> Self {
        Self {
            query,
            path_parameters,
            headers,
            section: Section::Payload(PayloadSection::Query),
        }
    }

    /// Query pairs and path values merged into one object, still as strings.
    fn collect_instance(&self) -> Map<String, Value> {
        let mut instance = match self.query {
            Some(query) => parse_query(query),
            None => Map::new(),
        };
        for (name, value) in self.path_parameters {
            instance.insert(name.clone(), Value::String(value.clone()));
        }
        instance
    }

    fn header_value(&self, name: &str) -> Option<String> {
        let value = self.headers.get(name)?;
        match value.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(_) => {
                log::warn!("Ignoring non-visible ASCII value of header {}", name);
                None
            }
        }
    }

    fn cookie_value(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    /// Checks a single header or cookie parameter.
    fn validate_single(
        schemas: &CompiledSchemas,
        operation: &Operation,
        parameter: &Parameter,
        value: Option<String>,
        section: Section,
    ) -> Result<(), ValidationErrorType> {
        let Some(value) = value else {
            if parameter.is_required() {
                return Err(ValidationErrorType::FieldExpected(
                    parameter.name().to_string(),
                    section,
                ));
            }
            return Ok(());
        };

        let instance = OpenApiPrimitives::coerce(parameter.schema(), &Value::String(value));
        let location = operation.location().join([
            PARAMETERS_FIELD,
            parameter.location().to_string().as_str(),
            parameter.name(),
        ]);
        Self::complex_validation_by_schema(schemas, &location, parameter.schema(), &instance, section)
    }
}

impl Validator for RequestParameterValidator<'_> {
    fn validate(
        &self,
        schemas: &CompiledSchemas,
        operation: &Operation,
    ) -> Result<(), ValidationErrorType> {
        let schema = operation.parameters_json_schema();
        let instance = OpenApiPrimitives::coerce(schema, &Value::Object(self.collect_instance()));
        let location = operation.location().join([PARAMETERS_FIELD]);
        Self::complex_validation_by_schema(
            schemas,
            &location,
            schema,
            &instance,
            self.section().clone(),
        )?;

        for parameter in operation.parameters() {
            match parameter.location() {
                ParameterLocation::Header => Self::validate_single(
                    schemas,
                    operation,
                    parameter,
                    self.header_value(parameter.name()),
                    Section::Payload(PayloadSection::Header),
                )?,
                ParameterLocation::Cookie => Self::validate_single(
                    schemas,
                    operation,
                    parameter,
                    self.cookie_value(parameter.name()),
                    Section::Payload(PayloadSection::Cookie),
                )?,
                ParameterLocation::Query | ParameterLocation::Path => {}
            }
        }
        Ok(())
    }

    fn section(&self) -> &Section {
        &self.section
    }
}

/// Form-decodes one query component; `+` stands for a space.
fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&raw)
        .decode_utf8_lossy()
        .into_owned()
}

/// Parses a raw query string into a JSON object of string values.
///
/// Bracketed names nest (`filter[tag]=x` becomes `{"filter": {"tag": "x"}}`)
/// and repeated names collect into an array in the order given.
pub(crate) fn parse_query(query: &str) -> Map<String, Value> {
    let mut instance = Map::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        };
        if key.is_empty() {
            log::warn!("Invalid query parameter: {}", pair);
            continue;
        }
        insert_nested(&mut instance, &split_nested_name(&key), Value::String(value));
    }
    instance
}

fn insert_nested(target: &mut Map<String, Value>, keys: &[&str], value: Value) {
    let Some((head, rest)) = keys.split_first() else {
        return;
    };

    if rest.is_empty() {
        match target.get_mut(*head) {
            None => {
                target.insert(head.to_string(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing @ Value::Object(_)) => {
                log::warn!("Query parameter {} is both a value and an object", head);
                *existing = value;
            }
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, value]);
            }
        }
        return;
    }

    let nested = target
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match nested {
        Value::Object(nested) => insert_nested(nested, rest, value),
        _ => log::warn!("Query parameter {} is both a value and an object", head),
    }
}

#[cfg(test)]
mod test {
    use super::parse_query;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn parse(query: &str) -> Value {
        Value::Object(parse_query(query))
    }

    #[test]
    fn test_parse_flat_query() {
        assert_eq!(
            parse("limit=10&term=big%20cats&flag"),
            json!({ "limit": "10", "term": "big cats", "flag": "" })
        );
    }

    #[test]
    fn test_parse_plus_as_space() {
        assert_eq!(parse("term=big+cats"), json!({ "term": "big cats" }));
    }

    #[test]
    fn test_parse_nested_query() {
        assert_eq!(
            parse("filter[tag]=pets&filter%5Bsize%5D%5Bmax%5D=3&term=x"),
            json!({
                "filter": { "tag": "pets", "size": { "max": "3" } },
                "term": "x"
            })
        );
    }

    #[test]
    fn test_parse_repeated_keys() {
        assert_eq!(
            parse("id=1&id=2&id=3&ids[]=a&ids[]=b"),
            json!({ "id": ["1", "2", "3"], "ids[]": ["a", "b"] })
        );
    }

    #[test]
    fn test_parse_skips_empty_and_nameless_pairs() {
        assert_eq!(parse("&=x&a=1&&"), json!({ "a": "1" }));
        assert_eq!(parse(""), json!({}));
    }

    #[test]
    fn test_parse_scalar_wins_over_nested() {
        assert_eq!(
            parse("filter=all&filter[tag]=pets"),
            json!({ "filter": "all" })
        );
        assert_eq!(
            parse("filter[tag]=pets&filter=all"),
            json!({ "filter": "all" })
        );
    }

    #[test]
    fn test_parse_malformed_brackets_stay_flat() {
        assert_eq!(parse("a[b=1&[c]=2"), json!({ "a[b": "1", "[c]": "2" }));
    }
}
