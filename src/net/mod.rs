//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → listener.rs (accept, enforce connection limit)
//!     → HTTP server (axum) over the permitted stream
//!     → permit released when the connection closes
//! ```
//!
//! # Design Decisions
//! - Connection limit enforced before accept (backpressure, not shedding)
//! - The permit travels inside the IO object so its lifetime is exact
//! - Accept errors are logged and retried, never fatal

pub mod listener;

pub use listener::{BoundedListener, ClientAddr, ListenerError};
