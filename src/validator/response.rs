use crate::error::{PayloadSection, Section, ValidationErrorType};
use crate::operation::{Operation, ResponseLookup};
use crate::validator::{CompiledSchemas, Validator};
use crate::{CONTENT_FIELD, DEFAULT_FIELD, RESPONSES_FIELD, SCHEMA_FIELD};
use serde_json::Value;

pub(crate) struct ResponseValidator<'v> {
    status: u16,
    content_type: Option<&'v str>,
    response_instance: Option<&'v Value>,
    section: Section,
}

impl<'v> ResponseValidator<'v> {
    pub(crate) fn new(
        status: u16,
        content_type: Option<&'v str>,
        response_instance: Option<&'v Value>,
    ) -> Self {
        Self {
            status,
            content_type,
            response_instance: response_instance.filter(|body| !body.is_null()),
            section: Section::Payload(PayloadSection::Response),
        }
    }

    /// The key of `responses` the status resolved to.
    fn response_key(operation: &Operation, status: u16) -> String {
        let status = status.to_string();
        match operation
            .data()
            .get(RESPONSES_FIELD)
            .and_then(|responses| responses.get(&status))
        {
            Some(_) => status,
            None => DEFAULT_FIELD.to_string(),
        }
    }
}

impl Validator for ResponseValidator<'_> {
    fn validate(
        &self,
        schemas: &CompiledSchemas,
        operation: &Operation,
    ) -> Result<(), ValidationErrorType> {
        let media_type = match self.content_type {
            Some(content_type) => content_type,
            None => match operation.content_type_for(self.status)? {
                Some(content_type) => content_type,
                None => return Ok(()),
            },
        };
        let Some(schema) = operation.response_schema_for(self.status, media_type)? else {
            return Ok(());
        };
        let Some(body) = self.response_instance else {
            return Err(ValidationErrorType::ValueExpected(
                format!("for the {} response of '{}'", self.status, operation.path_template()),
                self.section.clone(),
            ));
        };

        let location = operation.location().join([
            RESPONSES_FIELD,
            Self::response_key(operation, self.status).as_str(),
            CONTENT_FIELD,
            media_type,
            SCHEMA_FIELD,
        ]);
        Self::complex_validation_by_schema(schemas, &location, schema, body, self.section.clone())
    }

    fn section(&self) -> &Section {
        &self.section
    }
}
