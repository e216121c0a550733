//! Edge Router Library
//!
//! Public-facing static-asset and reverse-proxy front.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::EdgeConfig;
pub use http::EdgeServer;
pub use lifecycle::Shutdown;
