use crate::error::{PayloadSection, Section, ValidationErrorType};
use crate::operation::Operation;
use crate::traverser::OpenApiTraverser;
use crate::validator::{CompiledSchemas, Validator};
use crate::{CONTENT_FIELD, REQUEST_BODY_FIELD, REQUIRED_FIELD, SCHEMA_FIELD};
use serde_json::Value;

pub(crate) struct RequestBodyValidator<'v> {
    request_instance: Option<&'v Value>,
    content_type: Option<&'v str>,
    section: Section,
}

impl<'v> RequestBodyValidator<'v> {
    /// A `null` instance is treated as an absent body.
    pub(crate) fn new(request_instance: Option<&'v Value>, content_type: Option<&'v str>) -> Self {
        Self {
            request_instance: request_instance.filter(|body| !body.is_null()),
            content_type,
            section: Section::Payload(PayloadSection::Body),
        }
    }
}

impl Validator for RequestBodyValidator<'_> {
    fn validate(
        &self,
        schemas: &CompiledSchemas,
        operation: &Operation,
    ) -> Result<(), ValidationErrorType> {
        let Some(definition) = operation.request_body() else {
            if self.request_instance.is_some() {
                return Err(ValidationErrorType::SectionExpected(self.section.clone()));
            }
            return Ok(());
        };

        let is_body_required = OpenApiTraverser::get_flag(definition, REQUIRED_FIELD)
            .map_err(|e| ValidationErrorType::UnableToParse(e.to_string(), self.section.clone()))?;
        let Some(body) = self.request_instance else {
            if is_body_required {
                return Err(ValidationErrorType::ValueExpected(
                    format!("for the requestBody of '{}'", operation.path_template()),
                    self.section.clone(),
                ));
            }
            return Ok(());
        };

        let Some(content_type) = self.content_type else {
            return Err(ValidationErrorType::FieldExpected(
                http::header::CONTENT_TYPE.to_string(),
                Section::Payload(PayloadSection::Header),
            ));
        };

        let media = definition
            .get(CONTENT_FIELD)
            .and_then(|content| content.get(content_type));
        let Some(media) = media else {
            return Err(ValidationErrorType::FieldExpected(
                content_type.to_string(),
                self.section.clone(),
            ));
        };

        match media.get(SCHEMA_FIELD) {
            None => Ok(()),
            Some(schema) => {
                let location = operation.location().join([
                    REQUEST_BODY_FIELD,
                    CONTENT_FIELD,
                    content_type,
                    SCHEMA_FIELD,
                ]);
                Self::complex_validation_by_schema(
                    schemas,
                    &location,
                    schema,
                    body,
                    self.section.clone(),
                )
            }
        }
    }

    fn section(&self) -> &Section {
        &self.section
    }
}
