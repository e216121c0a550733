//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::listener)
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → routing table decides: statics.rs | proxy.rs
//!     → headers.rs (forwarding header policy, proxy path only)
//!     → response streamed to client, access-logged per rule
//! ```

pub mod headers;
pub mod proxy;
pub mod request;
pub mod server;
pub mod statics;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::EdgeServer;
