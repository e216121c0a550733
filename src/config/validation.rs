//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and URLs actually parse
//! - Validate value ranges (timeouts > 0, pool size > 0)
//! - Detect conflicting route rules
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{EdgeConfig, MatchKind};

/// A single semantic problem found in the configuration.
#[derive(Debug, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be > 0"));
    }

    match Url::parse(&config.origin.url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::new(
                    "origin.url",
                    format!("scheme must be http, got {:?}", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::new("origin.url", "missing host"));
            }
        }
        Err(e) => {
            errors.push(ValidationError::new("origin.url", format!("invalid URL: {e}")));
        }
    }
    if config.origin.pool_size == 0 {
        errors.push(ValidationError::new("origin.pool_size", "must be > 0"));
    }

    if config.static_files.root.as_os_str().is_empty() {
        errors.push(ValidationError::new("static_files.root", "must not be empty"));
    }
    if config.static_files.index_file.is_empty() || config.static_files.index_file.contains('/') {
        errors.push(ValidationError::new(
            "static_files.index_file",
            "must be a bare file name",
        ));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.response_secs", timeouts.response_secs),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        }
    }
    if timeouts.request_secs <= timeouts.response_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must exceed timeouts.response_secs so origin timeouts surface as 504",
        ));
    }

    let mut seen: HashSet<(MatchKind, &str)> = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{i}].pattern");
        if !route.pattern.starts_with('/') {
            errors.push(ValidationError::new(&field, "must start with '/'"));
            continue;
        }
        if route.match_kind == MatchKind::Prefix
            && route.pattern.len() > 1
            && route.pattern.ends_with('/')
        {
            errors.push(ValidationError::new(&field, "prefix must not end with '/'"));
        }
        if !seen.insert((route.match_kind, route.pattern.as_str())) {
            errors.push(ValidationError::new(
                &field,
                format!("duplicate rule for {:?}", route.pattern),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
