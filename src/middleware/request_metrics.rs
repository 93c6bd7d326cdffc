//! Per-request metrics.

use std::time::Instant;

use axum::http::StatusCode;

use crate::http::handler::{Handler, Middleware};
use crate::observability::metrics;

/// Count requests and time handlers through the metrics facade.
pub fn request_metrics() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            let start = Instant::now();
            next.call(req, w);

            let status = w.status().unwrap_or(StatusCode::OK);
            metrics::record_request(
                req.method().as_str(),
                req.uri().path(),
                status.as_u16(),
                start,
            );
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::Request;
    use crate::http::response::{BufferedResponse, ResponseWriter};
    use axum::body::Bytes;

    #[test]
    fn test_passes_response_through() {
        let handler = request_metrics().wrap(Handler::new(|_req, w| {
            w.write_header(StatusCode::NO_CONTENT);
        }));
        let mut w = BufferedResponse::new();
        handler.call(&Request::new(Bytes::new()), &mut w);

        assert_eq!(w.status(), Some(StatusCode::NO_CONTENT));
    }
}
