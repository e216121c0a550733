//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → access_log.rs (one entry per completed response)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Access log is a dedicated tracing target so it can be routed separately
//! - Byte counts are measured on the wire-bound body, not content-length
//! - Metrics are cheap (atomic increments) and optional

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{AccessLog, AccessLogEntry};
