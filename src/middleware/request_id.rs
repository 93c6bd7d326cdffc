//! Request ID propagation.
//!
//! # Design Decisions
//! - Reuse the client's `x-request-id` when present, else generate a UUID v4
//! - The ID is set on the response before the handler runs
//! - Handler logs are recorded inside a span carrying the ID

use axum::http::HeaderValue;
use uuid::Uuid;

use crate::http::handler::{Handler, Middleware, Request};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tag every response with a request ID.
pub fn request_id() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            let id = incoming_id(req).unwrap_or_else(|| Uuid::new_v4().to_string());
            match HeaderValue::from_str(&id) {
                Ok(value) => {
                    w.headers_mut().insert(X_REQUEST_ID, value);
                }
                Err(e) => tracing::warn!(error = %e, "Request ID not representable as header"),
            }

            let span = tracing::info_span!(
                "request",
                request_id = %id,
                method = %req.method(),
                path = %req.uri().path()
            );
            let _entered = span.enter();
            next.call(req, w);
        })
    })
}

fn incoming_id(req: &Request) -> Option<String> {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::BufferedResponse;
    use axum::body::Bytes;

    #[test]
    fn test_generates_uuid() {
        let handler = request_id().wrap(Handler::new(|_req, _w| {}));
        let mut w = BufferedResponse::new();
        handler.call(&Request::new(Bytes::new()), &mut w);

        let id = w.sent_headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_echoes_incoming_id() {
        let handler = request_id().wrap(Handler::new(|_req, _w| {}));
        let req = axum::http::Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Bytes::new())
            .unwrap();
        let mut w = BufferedResponse::new();
        handler.call(&req, &mut w);

        assert_eq!(w.sent_headers().get(X_REQUEST_ID).unwrap(), "abc-123");
    }
}
