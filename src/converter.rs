use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// The parts of an HTTP request the gateway looks at.
pub trait HttpLike<T>
where
    T: Serialize,
{
    fn method_ref(&self) -> &Method;
    fn path_ref(&self) -> &str;
    fn headers_ref(&self) -> &HeaderMap;
    fn body_ref(&self) -> &T;
    /// The body as JSON, `None` if it cannot be represented as JSON.
    fn converted_body(&self) -> Option<Value>;
    fn query_ref(&self) -> Option<&str>;
}

impl<T> HttpLike<T> for http::Request<T>
where
    T: Serialize,
{
    fn method_ref(&self) -> &Method {
        self.method()
    }

    fn path_ref(&self) -> &str {
        self.uri().path()
    }

    fn headers_ref(&self) -> &HeaderMap {
        self.headers()
    }

    fn body_ref(&self) -> &T {
        self.body()
    }

    fn converted_body(&self) -> Option<Value> {
        match serde_json::to_value(self.body()) {
            Ok(val) => Some(val),
            Err(e) => {
                log::warn!("Request body is not representable as JSON: {}", e);
                None
            }
        }
    }

    fn query_ref(&self) -> Option<&str> {
        self.uri().query()
    }
}

#[derive(Debug)]
pub enum BodyError {
    InvalidUtf8,
    InvalidJson(String),
    FailedToReadStream,
}

impl Display for BodyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyError::InvalidUtf8 => write!(f, "Invalid UTF-8"),
            BodyError::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            BodyError::FailedToReadStream => write!(f, "Failed to read stream"),
        }
    }
}

impl std::error::Error for BodyError {}

/// Reads a request body into memory.
///
/// An empty body reads as JSON `null`, which the validator treats as no body.
pub trait RequestBody: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn to_bytes(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
    fn to_string(self) -> impl Future<Output = Result<String, Self::Error>> + Send;
    fn to_json(self) -> impl Future<Output = Result<Value, Self::Error>> + Send;
}

fn parse_json(text: &str) -> Result<Value, BodyError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| BodyError::InvalidJson(e.to_string()))
}

impl RequestBody for String {
    type Error = BodyError;

    async fn to_bytes(self) -> Result<Bytes, Self::Error> {
        Ok(Bytes::from(self))
    }

    async fn to_string(self) -> Result<String, Self::Error> {
        Ok(self)
    }

    async fn to_json(self) -> Result<Value, Self::Error> {
        parse_json(&self)
    }
}

impl RequestBody for Bytes {
    type Error = BodyError;

    async fn to_bytes(self) -> Result<Bytes, Self::Error> {
        Ok(self)
    }

    async fn to_string(self) -> Result<String, Self::Error> {
        String::from_utf8(self.to_vec()).map_err(|_| BodyError::InvalidUtf8)
    }

    async fn to_json(self) -> Result<Value, Self::Error> {
        let string = RequestBody::to_string(self).await?;
        parse_json(&string)
    }
}

#[cfg(feature = "hyper")]
pub mod hyper {
    use crate::converter::{BodyError, RequestBody, parse_json};
    use bytes::Bytes;
    use serde_json::Value;

    impl RequestBody for hyper::body::Incoming {
        type Error = BodyError;

        async fn to_bytes(self) -> Result<Bytes, Self::Error> {
            use http_body_util::BodyExt;
            match self.collect().await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(e) => {
                    log::warn!("Failed to read request body: {}", e);
                    Err(BodyError::FailedToReadStream)
                }
            }
        }

        async fn to_string(self) -> Result<String, Self::Error> {
            let bytes = self.to_bytes().await?;
            String::from_utf8(bytes.to_vec()).map_err(|_| BodyError::InvalidUtf8)
        }

        async fn to_json(self) -> Result<Value, Self::Error> {
            let string = self.to_string().await?;
            parse_json(&string)
        }
    }
}
