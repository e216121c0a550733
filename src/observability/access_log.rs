//! Per-request access logging.
//!
//! # Responsibilities
//! - Capture request fields up front, response fields at completion
//! - Emit Combined Log Format (plus the forwarded-for chain) or JSON lines
//! - Count the bytes actually sent, including aborted transfers
//!
//! # Design Decisions
//! - The entry is finalized by a body wrapper, so the logged byte count is
//!   what went on the wire rather than a content-length promise
//! - Client disconnects still produce an entry (emit on drop)
//! - Suppressed routes skip the wrapper entirely

use std::net::IpAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{REFERER, USER_AGENT};
use axum::http::{Request, Response};
use bytes::Bytes;
use serde::Serialize;

use crate::config::{AccessLogConfig, LogFormat};
use crate::http::headers::X_FORWARDED_FOR;

/// One completed (or aborted) request/response exchange.
#[derive(Debug, Serialize)]
pub struct AccessLogEntry {
    pub timestamp: String,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: u16,
    pub bytes_sent: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub forwarded_for: Option<String>,
}

/// Access log front-end held in the application state.
#[derive(Debug, Clone)]
pub struct AccessLog {
    enabled: bool,
    format: LogFormat,
}

impl AccessLog {
    pub fn from_config(config: &AccessLogConfig) -> Self {
        Self {
            enabled: config.enabled,
            format: config.format,
        }
    }

    /// Capture the request-side fields of an entry.
    pub fn begin<B>(&self, request: &Request<B>, client_ip: IpAddr) -> AccessLogEntry {
        let header = |name| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        AccessLogEntry {
            timestamp: String::new(),
            client_ip: client_ip.to_string(),
            method: request.method().to_string(),
            path: request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| request.uri().path())
                .to_string(),
            protocol: format!("{:?}", request.version()),
            status: 0,
            bytes_sent: 0,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
            forwarded_for: header(X_FORWARDED_FOR),
        }
    }

    /// Attach the entry to the response; it is emitted when the body
    /// finishes (or is dropped by a disconnecting client).
    pub fn finish(&self, mut entry: AccessLogEntry, response: Response<Body>) -> Response<Body> {
        if !self.enabled {
            return response;
        }
        entry.status = response.status().as_u16();
        let (parts, body) = response.into_parts();
        let counted = CountingBody::new(body, entry, self.format);
        Response::from_parts(parts, Body::new(counted))
    }
}

fn emit(mut entry: AccessLogEntry, format: LogFormat, bytes_sent: u64) {
    entry.bytes_sent = bytes_sent;
    entry.timestamp = chrono::Local::now()
        .format("%d/%b/%Y:%H:%M:%S %z")
        .to_string();
    match format {
        LogFormat::Combined => {
            tracing::info!(target: "access", "{}", combined_line(&entry));
        }
        LogFormat::Json => match serde_json::to_string(&entry) {
            Ok(line) => tracing::info!(target: "access", "{line}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize access log entry"),
        },
    }
}

fn combined_line(entry: &AccessLogEntry) -> String {
    format!(
        "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\" \"{}\"",
        entry.client_ip,
        entry.timestamp,
        entry.method,
        entry.path,
        entry.protocol,
        entry.status,
        entry.bytes_sent,
        entry.referer.as_deref().unwrap_or("-"),
        entry.user_agent.as_deref().unwrap_or("-"),
        entry.forwarded_for.as_deref().unwrap_or("-"),
    )
}

/// Body wrapper that counts data frames and emits the pending entry when
/// the stream ends.
struct CountingBody {
    inner: Pin<Box<dyn http_body::Body<Data = Bytes, Error = axum::Error> + Send + 'static>>,
    pending: Option<(AccessLogEntry, LogFormat)>,
    sent: u64,
}

impl CountingBody {
    fn new(inner: Body, entry: AccessLogEntry, format: LogFormat) -> Self {
        Self {
            inner: Box::pin(inner),
            pending: Some((entry, format)),
            sent: 0,
        }
    }

    fn finish(&mut self) {
        if let Some((entry, format)) = self.pending.take() {
            emit(entry, format, self.sent);
        }
    }
}

impl http_body::Body for CountingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.sent += data.len() as u64;
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        self.finish();
    }
}
