use crate::error::ResponseError;
use crate::{CONTENT_FIELD, DEFAULT_FIELD, SCHEMA_FIELD};
use serde_json::Value;

/// Finds the response object for `status` in a `responses` map.
///
/// The exact status code wins over `default`. Range keys such as `2XX` are
/// not matched.
pub(crate) fn find_response(responses: Option<&Value>, status: u16) -> Option<&Value> {
    let responses = responses?.as_object()?;
    responses
        .get(status.to_string().as_str())
        .or_else(|| responses.get(DEFAULT_FIELD))
}

/// Response lookups of an operation.
///
/// Only [`ResponseLookup::response_for`] has to be provided; the media type
/// and schema lookups are derived from it.
pub trait ResponseLookup {
    /// Uppercased HTTP method, used in error messages.
    fn method(&self) -> &str;

    /// Path template, used in error messages.
    fn path_template(&self) -> &str;

    /// Returns the response object for `status`, falling back to `default`.
    fn response_for(&self, status: u16) -> Result<&Value, ResponseError>;

    /// Returns the first media type declared for the response in document order.
    ///
    /// `Ok(None)` when the response declares no content.
    fn content_type_for(&self, status: u16) -> Result<Option<&str>, ResponseError> {
        let response = self.response_for(status)?;
        Ok(response
            .get(CONTENT_FIELD)
            .and_then(Value::as_object)
            .and_then(|content| content.keys().next())
            .map(String::as_str))
    }

    /// Returns the schema declared for `status` and `media_type`.
    ///
    /// `Ok(None)` when the response has no content, an empty content map, or
    /// a media type entry without a schema. A response that declares media
    /// types but not `media_type` is an error.
    fn response_schema_for(
        &self,
        status: u16,
        media_type: &str,
    ) -> Result<Option<&Value>, ResponseError> {
        let response = self.response_for(status)?;
        let content = match response.get(CONTENT_FIELD).and_then(Value::as_object) {
            None => return Ok(None),
            Some(content) if content.is_empty() => return Ok(None),
            Some(content) => content,
        };

        match content.get(media_type) {
            None => Err(ResponseError::media_type_not_found(
                media_type,
                self.method(),
                self.path_template(),
            )),
            Some(media) => Ok(media.get(SCHEMA_FIELD)),
        }
    }
}
