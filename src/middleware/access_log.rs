//! Access logging middleware.
//!
//! # Responsibilities
//! - Capture status and body size by wrapping the response sink
//! - Emit one line per request in JSON or combined log format
//!
//! # Design Decisions
//! - Output is any shared `Write`; stdout by default
//! - A handler that writes nothing is logged as 200, matching what is sent

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, StatusCode};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::http::handler::{Handler, Middleware, Request};
use crate::http::response::ResponseWriter;

/// Line format of the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    Json,
    #[default]
    Combined,
}

/// Shared destination for log lines.
pub type LogOutput = Arc<Mutex<dyn Write + Send>>;

/// Where and how to write access log lines.
#[derive(Clone)]
pub struct AccessLogConfig {
    pub output: LogOutput,
    pub format: AccessLogFormat,
}

impl AccessLogConfig {
    pub fn new(output: LogOutput, format: AccessLogFormat) -> Self {
        Self { output, format }
    }

    pub fn stdout(format: AccessLogFormat) -> Self {
        Self::new(Arc::new(Mutex::new(io::stdout())), format)
    }
}

/// One logged request.
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub size: usize,
    pub user_agent: String,
    pub referer: String,
    pub duration_ms: u128,
    pub timestamp: DateTime<Local>,
}

impl AccessLogEntry {
    /// Render in combined log format, without a trailing newline.
    pub fn combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/1.1\" {} {} \"{}\" \"{}\" {}ms",
            self.remote_addr,
            self.timestamp.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status,
            self.size,
            self.referer,
            self.user_agent,
            self.duration_ms,
        )
    }
}

/// Log every request passing through with `config`.
pub fn access_logging(config: AccessLogConfig) -> Middleware {
    Middleware::new(move |next: Handler| {
        let config = config.clone();
        Handler::new(move |req, w| {
            let timestamp = Local::now();
            let start = Instant::now();

            let mut recorder = StatusRecorder::new(w);
            next.call(req, &mut recorder);

            let entry = AccessLogEntry {
                remote_addr: remote_addr(req),
                method: req.method().to_string(),
                path: req.uri().path().to_string(),
                status: recorder.status().unwrap_or(StatusCode::OK).as_u16(),
                size: recorder.size,
                user_agent: header_str(req.headers(), header::USER_AGENT),
                referer: header_str(req.headers(), header::REFERER),
                duration_ms: start.elapsed().as_millis(),
                timestamp,
            };
            write_entry(&config, &entry);
        })
    })
}

fn write_entry(config: &AccessLogConfig, entry: &AccessLogEntry) {
    let line = match config.format {
        AccessLogFormat::Combined => entry.combined(),
        AccessLogFormat::Json => match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode access log entry");
                return;
            }
        },
    };

    let mut output = config.output.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(output, "{line}") {
        tracing::warn!(error = %e, "Failed to write access log entry");
    }
}

fn remote_addr(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Sink wrapper counting body bytes.
struct StatusRecorder<'a> {
    inner: &'a mut dyn ResponseWriter,
    size: usize,
}

impl<'a> StatusRecorder<'a> {
    fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, size: 0 }
    }
}

impl ResponseWriter for StatusRecorder<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.inner.write_header(status)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.size += n;
        Ok(n)
    }

    fn status(&self) -> Option<StatusCode> {
        self.inner.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::BufferedResponse;
    use axum::body::Bytes;

    fn capture(format: AccessLogFormat) -> (AccessLogConfig, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let output: LogOutput = buffer.clone();
        (AccessLogConfig::new(output, format), buffer)
    }

    fn request() -> Request {
        let mut req = axum::http::Request::builder()
            .method("POST")
            .uri("/items?page=2")
            .header("user-agent", "test-agent")
            .header("referer", "http://example.com/")
            .body(Bytes::new())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.1:4000".parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_combined_line() {
        let (config, buffer) = capture(AccessLogFormat::Combined);
        let handler = access_logging(config).wrap(Handler::new(|_req, w| {
            w.write_header(StatusCode::CREATED);
            let _ = w.write(b"12345");
        }));

        let mut w = BufferedResponse::new();
        handler.call(&request(), &mut w);

        let line = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(line.starts_with("10.0.0.1:4000 - - ["));
        assert!(line.contains("\"POST /items HTTP/1.1\" 201 5 \"http://example.com/\" \"test-agent\""));
        assert!(line.ends_with("ms\n"));
    }

    #[test]
    fn test_json_line() {
        let (config, buffer) = capture(AccessLogFormat::Json);
        let handler = access_logging(config).wrap(Handler::new(|_req, w| {
            let _ = w.write(b"ok");
        }));

        let mut w = BufferedResponse::new();
        handler.call(&request(), &mut w);

        let line = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["path"], "/items");
        assert_eq!(value["status"], 200);
        assert_eq!(value["size"], 2);
        assert_eq!(value["remote_addr"], "10.0.0.1:4000");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_silent_handler_logged_as_ok() {
        let (config, buffer) = capture(AccessLogFormat::Json);
        let handler = access_logging(config).wrap(Handler::new(|_req, _w| {}));

        let mut w = BufferedResponse::new();
        handler.call(&Request::new(Bytes::new()), &mut w);

        let line = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["status"], 200);
        assert_eq!(value["size"], 0);
        assert_eq!(value["remote_addr"], "");
    }
}
