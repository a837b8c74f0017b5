use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use oasgate::ValidationErrorType;
use oasgate::cache::ValidatorCollection;
use oasgate::converter::RequestBody;
use oasgate::validator::OpenApiPayloadValidator;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

const API_ID: &str = "hello";
const SPEC_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/hello-app/openapi.yaml");

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &json!({ "error": message }))
}

async fn handle(
    validator: Arc<OpenApiPayloadValidator>,
    request: http::Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = request.into_parts();
    let body = match body.to_json().await {
        Ok(body) => body,
        Err(e) => return Ok(error_response(StatusCode::BAD_REQUEST, &e.to_string())),
    };
    let request = http::Request::from_parts(parts, body);

    let route = match validator.validate_request(&request) {
        Ok(route) => route,
        Err(ValidationErrorType::OperationNotFound { .. }) => {
            return Ok(error_response(StatusCode::NOT_FOUND, "Not Found"));
        }
        Err(e) => return Ok(error_response(StatusCode::BAD_REQUEST, &e.to_string())),
    };

    let operation = route.operation();
    let greeting = match operation.operation_id() {
        Some("hello") => json!({ "hello": "world" }),
        _ => return Ok(error_response(StatusCode::NOT_IMPLEMENTED, "Not Implemented")),
    };

    if let Err(e) = validator.validate_response(operation, 200, None, Some(&greeting)) {
        println!("Response does not match the specification: {}", e);
        return Ok(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        ));
    }
    Ok(json_response(StatusCode::OK, &greeting))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = ([127, 0, 0, 1], 3000).into();
    let listener = TcpListener::bind(addr).await?;

    let validators = ValidatorCollection::<String>::new();
    validators.insert_from_file_path(API_ID.to_string(), SPEC_PATH)?;
    let validator = validators.get(&API_ID.to_string())?;
    println!("Listening on http://{}", addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let validator = validator.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |request| handle(validator.clone(), request));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                println!("Error serving connection: {:?}", err);
            }
        });
    }
}
