//! Gzip response compression.

use std::io::{self, Write};

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::http::handler::{Handler, Middleware};
use crate::http::response::ResponseWriter;

/// Gzip the response body when the client accepts it.
pub fn compression() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            let accepts_gzip = req
                .headers()
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains("gzip"));
            if !accepts_gzip {
                next.call(req, w);
                return;
            }

            let headers = w.headers_mut();
            headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
            headers.remove(header::CONTENT_LENGTH);

            let mut gzip = GzipWriter::new(w);
            next.call(req, &mut gzip);
            gzip.finish();
        })
    })
}

/// Sink wrapper feeding body writes through a gzip encoder.
struct GzipWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    encoder: GzEncoder<Vec<u8>>,
}

impl<'a> GzipWriter<'a> {
    fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            encoder: GzEncoder::new(Vec::new(), Compression::default()),
        }
    }

    /// Flush the compressed stream into the wrapped sink.
    fn finish(self) {
        match self.encoder.finish() {
            Ok(compressed) => {
                if let Err(e) = self.inner.write(&compressed) {
                    tracing::warn!(error = %e, "Failed to write compressed body");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to finish gzip stream"),
        }
    }
}

impl ResponseWriter for GzipWriter<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        // The length set by the handler describes the uncompressed body.
        self.inner.headers_mut().remove(header::CONTENT_LENGTH);
        self.inner.write_header(status)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.status().is_none() {
            self.write_header(StatusCode::OK);
        }
        self.encoder.write_all(buf)?;
        Ok(buf.len())
    }

    fn status(&self) -> Option<StatusCode> {
        self.inner.status()
    }
}
