//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Default filter covering the crate, tower-http, and the access target
//!
//! # Design Decisions
//! - RUST_LOG overrides the configured level when set
//! - Uses the tracing crate for structured logging

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("edge_router={log_level},tower_http={log_level},access=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
