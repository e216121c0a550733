//! Static file serving from the document root.
//!
//! # Responsibilities
//! - Resolve request paths against the document root, safely
//! - Serve file bytes with the matched route's cache policy
//! - Answer conditional requests with 304
//! - Report missing files per the route's log policy
//!
//! # Design Decisions
//! - Percent-decoding happens before path resolution; traversal segments
//!   reject the whole request rather than being normalized away
//! - Directory paths resolve to the configured index file, no auto-index
//! - Bodies are streamed, never buffered

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::header::{
    HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, IF_MODIFIED_SINCE,
    LAST_MODIFIED,
};
use axum::http::{Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use tokio_util::io::ReaderStream;

use crate::config::StaticConfig;
use crate::routing::RouteRule;

/// Serves files beneath a fixed document root.
#[derive(Debug)]
pub struct StaticFiles {
    root: PathBuf,
    index_file: String,
}

impl StaticFiles {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            root: config.root.clone(),
            index_file: config.index_file.clone(),
        }
    }

    /// Serve the request path from the document root, applying the matched
    /// rule's cache and log policies.
    pub async fn serve<B>(&self, request: &Request<B>, rule: &RouteRule) -> Response<Body> {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            let mut response =
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            return response;
        }

        let raw_path = request.uri().path();
        let Some(mut path) = self.resolve(raw_path) else {
            return self.not_found(raw_path, rule);
        };

        let mut metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => return self.read_error(raw_path, rule, e),
        };
        if metadata.is_dir() {
            path.push(&self.index_file);
            metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => return self.read_error(raw_path, rule, e),
            };
        }
        if !metadata.is_file() {
            return self.not_found(raw_path, rule);
        }

        let modified = metadata.modified().ok();
        if let (Some(modified), Some(since)) = (
            modified,
            request
                .headers()
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_http_date),
        ) {
            if unix_secs(modified) <= unix_secs(since) {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::NOT_MODIFIED;
                self.apply_headers(&mut response, rule, modified);
                return response;
            }
        }

        let body = if method == Method::HEAD {
            Body::empty()
        } else {
            match tokio::fs::File::open(&path).await {
                Ok(file) => Body::from_stream(ReaderStream::new(file)),
                Err(e) => return self.read_error(raw_path, rule, e),
            }
        };

        let mut response = Response::new(body);
        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            // Mime types render as plain ASCII.
            HeaderValue::from_str(mime.as_ref()).expect("mime header value"),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(metadata.len()));
        if let Some(modified) = modified {
            self.apply_headers(&mut response, rule, modified);
        } else if let Some(value) = rule.cache.header_value() {
            response.headers_mut().insert(CACHE_CONTROL, value);
        }
        response
    }

    fn apply_headers(
        &self,
        response: &mut Response<Body>,
        rule: &RouteRule,
        modified: SystemTime,
    ) {
        let headers = response.headers_mut();
        if let Some(value) = rule.cache.header_value() {
            headers.insert(CACHE_CONTROL, value);
        }
        if let Ok(value) = HeaderValue::from_str(&http_date(modified)) {
            headers.insert(LAST_MODIFIED, value);
        }
    }

    fn not_found(&self, raw_path: &str, rule: &RouteRule) -> Response<Body> {
        if rule.log.not_found {
            tracing::warn!(path = raw_path, root = %self.root.display(), "Static file not found");
        }
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    }

    fn read_error(&self, raw_path: &str, rule: &RouteRule, error: std::io::Error) -> Response<Body> {
        if error.kind() == std::io::ErrorKind::NotFound {
            return self.not_found(raw_path, rule);
        }
        tracing::error!(path = raw_path, error = %error, "Static file read failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }

    /// Map a request path to a filesystem path, or None when the path
    /// escapes the document root.
    fn resolve(&self, raw_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(raw_path).ok()?;
        if decoded.contains('\0') {
            return None;
        }
        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                segment if segment.contains('\\') => return None,
                segment => path.push(segment),
            }
        }
        Some(path)
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn http_date(t: SystemTime) -> String {
    let dt: chrono::DateTime<chrono::Utc> = t.into();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn parse_http_date(s: &str) -> Option<SystemTime> {
    chrono::DateTime::parse_from_rfc2822(s)
        .ok()
        .map(SystemTime::from)
}
