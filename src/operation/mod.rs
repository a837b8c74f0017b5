pub mod parameters;
pub mod response;

pub use crate::operation::parameters::ParameterSchemaOptions;
pub use crate::operation::response::ResponseLookup;

use crate::error::{OperationSection, ResponseError, Section, SpecificationError, SpecificationSection};
use crate::operation::parameters::build_parameters_schema;
use crate::operation::response::find_response;
use crate::traverser::OpenApiTraverser;
use crate::types::json_path::JsonPath;
use crate::types::parameter::Parameter;
use crate::{OPERATION_ID_FIELD, PARAMETERS_FIELD, PATHS_FIELD, REQUEST_BODY_FIELD, RESPONSES_FIELD};
use serde_json::Value;

/// A single `(method, path template)` entry of the document.
///
/// Operations are immutable once built. The parameters schema is derived
/// while building, so a document that cannot be folded into one fails to
/// load instead of failing on the first request.
#[derive(Debug)]
pub struct Operation {
    method: String,
    path_template: String,
    operation_id: Option<String>,
    location: JsonPath,
    data: Value,
    parameters: Vec<Parameter>,
    parameters_schema: Value,
}

impl Operation {
    /// Builds an operation from its (dereferenced) operation object.
    pub fn new(method: &str, path_template: &str, data: Value) -> Result<Self, SpecificationError> {
        Self::with_options(
            method,
            path_template,
            data,
            &[],
            ParameterSchemaOptions::default(),
        )
    }

    /// Builds an operation, merging in the parameters declared on its path item.
    ///
    /// An operation parameter with the same name and location as an
    /// inherited one replaces it.
    pub fn with_options(
        method: &str,
        path_template: &str,
        data: Value,
        inherited: &[Parameter],
        options: ParameterSchemaOptions,
    ) -> Result<Self, SpecificationError> {
        let parameters_section =
            Section::Specification(SpecificationSection::Paths(OperationSection::Parameters));

        let mut parameters = inherited.to_vec();
        let declared = OpenApiTraverser::get_optional_array(&data, PARAMETERS_FIELD)
            .map_err(|e| SpecificationError::traversal_failed(e, parameters_section.clone()))?;
        for definition in declared.into_iter().flatten() {
            let parameter = Parameter::from_value(definition)
                .map_err(|e| SpecificationError::traversal_failed(e, parameters_section.clone()))?;
            match parameters.iter_mut().find(|existing| {
                existing.name() == parameter.name() && existing.location() == parameter.location()
            }) {
                Some(existing) => *existing = parameter,
                None => parameters.push(parameter),
            }
        }

        let operation_id = OpenApiTraverser::get_optional_str(&data, OPERATION_ID_FIELD)
            .map_err(|e| {
                SpecificationError::traversal_failed(
                    e,
                    Section::Specification(SpecificationSection::Paths(OperationSection::Other)),
                )
            })?
            .map(str::to_string);

        let method = method.to_uppercase();
        let name = format!("{} {}", method, path_template);
        let parameters_schema = build_parameters_schema(&parameters, options, &name)?;

        let mut location = JsonPath::new();
        location
            .add(PATHS_FIELD)
            .add(path_template)
            .add(method.to_lowercase());

        log::debug!(
            "Built operation {} with {} parameter(s)",
            name,
            parameters.len()
        );
        Ok(Self {
            method,
            path_template: path_template.to_string(),
            operation_id,
            location,
            data,
            parameters,
            parameters_schema,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Where the operation lives in the document.
    pub fn location(&self) -> &JsonPath {
        &self.location
    }

    /// The raw operation object.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Every parameter, including the ones inherited from the path item.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn request_body(&self) -> Option<&Value> {
        self.data.get(REQUEST_BODY_FIELD)
    }

    /// JSON Schema of the query and path parameters combined.
    pub fn parameters_json_schema(&self) -> &Value {
        &self.parameters_schema
    }
}

impl ResponseLookup for Operation {
    fn method(&self) -> &str {
        &self.method
    }

    fn path_template(&self) -> &str {
        &self.path_template
    }

    fn response_for(&self, status: u16) -> Result<&Value, ResponseError> {
        find_response(self.data.get(RESPONSES_FIELD), status).ok_or_else(|| {
            ResponseError::code_not_found(status, &self.method, &self.path_template)
        })
    }
}
