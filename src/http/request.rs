//! Request identification.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client sent none
//! - Expose the ID to handlers for log correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as-is and echoed back

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Mints a fresh UUID v4 for each request lacking an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> String;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> String {
        self.extensions()
            .get::<RequestId>()
            .map(RequestId::header_value)
            .or_else(|| self.headers().get(X_REQUEST_ID))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_generates_uuid() {
        let request = Request::new(Body::empty());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn test_reads_header_when_no_extension() {
        let request = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.request_id(), "abc-123");
    }

    #[test]
    fn test_extension_wins() {
        let mut request = Request::builder()
            .header(X_REQUEST_ID, "from-header")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("from-layer")));
        assert_eq!(request.request_id(), "from-layer");
    }

    #[test]
    fn test_unknown_without_id() {
        assert_eq!(Request::new(Body::empty()).request_id(), "unknown");
    }
}
