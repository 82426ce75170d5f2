//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, StatusCode, header::CONTENT_TYPE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::router::MAX_BODY_SIZE;

/// Bodies longer than this many bytes are truncated in the `info` log.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 1] = ["password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in form submissions are replaced with asterisks.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_bytes) = match read_request(request).await {
        Ok(parts_and_body) => parts_and_body,
        Err(response) => return response,
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    let is_form_post = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form_post {
        let display_text = REDACTED_FIELDS
            .iter()
            .fold(body_text.to_string(), |text, field| redact_field(&text, field));
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Response::from_parts(parts, Body::empty());
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Buffer the request body, rejecting bodies over [MAX_BODY_SIZE] bytes.
async fn read_request(request: Request) -> Result<(Parts, Bytes), Response> {
    let (parts, body) = request.into_parts();

    match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => Ok((parts, bytes)),
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            Err(StatusCode::PAYLOAD_TOO_LARGE.into_response())
        }
    }
}

/// Replace the value of every `field_name=...` pair in a URL encoded form.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name == field_name => format!("{field_name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(text: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}


#[cfg(test)]
mod logging_middleware_tests {
    use axum::{Router, body::Bytes, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;

    use crate::router::MAX_BODY_SIZE;

    use super::logging_middleware;

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(|body: Bytes| async move { body }))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn forwards_request_bytes_unchanged() {
        let server = get_test_server();
        let body = Bytes::from_static(b"{\"title\": \"\xff\xfe\"}");

        let response = server.post("/echo").bytes(body.clone()).await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes(), &body);
    }

    #[tokio::test]
    async fn rejects_oversized_request_body() {
        let server = get_test_server();
        let body = Bytes::from(vec![b'a'; MAX_BODY_SIZE + 1]);

        let response = server.post("/echo").bytes(body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
