//! Response sink handed to handlers.
//!
//! # Responsibilities
//! - Collect status, headers and body bytes written by a handler
//! - Commit status and headers on the first status or body write
//! - Convert the collected response into an axum response
//!
//! # Design Decisions
//! - First `write_header` wins; superfluous calls are logged and ignored
//! - A body write without a prior status commits `200 OK`
//! - Header edits after commit are kept locally but never sent

use std::io;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

/// Sink a handler writes its response into.
pub trait ResponseWriter {
    /// Headers that will be sent when the response is committed.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the pending headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the status code, committing status and headers.
    fn write_header(&mut self, status: StatusCode);

    /// Append body bytes, committing `200 OK` first if nothing was committed.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Committed status, if any.
    fn status(&self) -> Option<StatusCode>;
}

/// Buffers the whole response in memory.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Headers as they were at commit time, or the pending ones if uncommitted.
    pub fn sent_headers(&self) -> &HeaderMap {
        match &self.committed {
            Some((_, headers)) => headers,
            None => &self.headers,
        }
    }

    /// Finish the response. An untouched sink becomes an empty `200 OK`.
    pub fn into_response(self) -> Response {
        let (status, headers) = self
            .committed
            .unwrap_or((StatusCode::OK, self.headers));

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some((current, _)) = &self.committed {
            tracing::warn!(
                current = %current,
                ignored = %status,
                "Superfluous write_header call"
            );
            return;
        }
        self.committed = Some((status, self.headers.clone()));
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.committed.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }
}

/// Reply with a plain-text error message and the given status.
pub fn error(w: &mut dyn ResponseWriter, message: &str, status: StatusCode) {
    let headers = w.headers_mut();
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    w.write_header(status);
    let _ = w.write(message.as_bytes());
    let _ = w.write(b"\n");
}
