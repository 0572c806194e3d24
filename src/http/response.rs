//! JSON response construction.
//!
//! # Responsibilities
//! - Serialize handler payloads with `Content-Type: application/json`
//! - Build the host's own terminal responses (404, 405, 400, 413, 408)
//! - Rewrite middleware rejections (body limit, timeout) as JSON
//!
//! # Design Decisions
//! - Every body leaving the service is JSON, including host errors

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::resource::Verb;

/// Write `payload` as JSON with `status`.
pub fn respond(status: StatusCode, payload: impl Serialize) -> Response {
    (status, Json(payload)).into_response()
}

/// No mounted resource handled the path.
pub fn not_found(path: &str) -> Response {
    respond(
        StatusCode::NOT_FOUND,
        json!({ "message": "Not Found", "path": path }),
    )
}

/// The resource exists but has no handler for the verb.
pub fn method_not_allowed(method: &str, allowed: &[Verb]) -> Response {
    let allow = allowed
        .iter()
        .map(|v| v.as_str().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");
    let mut response = respond(
        StatusCode::METHOD_NOT_ALLOWED,
        json!({
            "message": format!("Method {} not allowed", method.to_uppercase()),
            "allowed": allowed.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
        }),
    );
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// The request body was not valid JSON.
pub fn malformed_body(error: &serde_json::Error) -> Response {
    respond(
        StatusCode::BAD_REQUEST,
        json!({ "name": "SyntaxError", "message": error.to_string() }),
    )
}

/// The request body exceeded the configured limit.
pub fn body_too_large(limit: usize) -> Response {
    respond(
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({ "message": format!("request body exceeds {} bytes", limit) }),
    )
}

/// The request did not complete within the configured timeout.
pub fn request_timeout() -> Response {
    respond(
        StatusCode::REQUEST_TIMEOUT,
        json!({ "message": "request timed out" }),
    )
}

/// Replace non-JSON 413 and 408 bodies produced by the limit and timeout
/// layers. Every other response passes through untouched.
pub async fn json_rejections(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => respond(
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "message": "request body too large" }),
        ),
        StatusCode::REQUEST_TIMEOUT => request_timeout(),
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_sets_json_content_type() {
        let response = respond(StatusCode::CREATED, json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_method_not_allowed_lists_verbs() {
        let response = method_not_allowed("put", &[Verb::Get, Verb::Post]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_json_rejections_rewrites_timeout() {
        let bare = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = json_rejections(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_json_rejections_rewrites_plain_413() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let response = json_rejections(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_json_rejections_keeps_other_responses() {
        let ours = body_too_large(16);
        let response = json_rejections(ours).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let plain = (StatusCode::OK, "fine").into_response();
        let response = json_rejections(plain).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(not_found("/nope").status(), StatusCode::NOT_FOUND);
    }
}
