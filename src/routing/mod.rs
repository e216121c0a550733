//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (route lookup)
//!     → policy.rs (pattern match, cache/log policy)
//!     → Return: matched RouteRule (default rule proxies to origin)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Exact rules into a map, prefix rules sorted longest-first
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact-match rules always checked before prefix rules
//! - Longest prefix wins; no regex in the hot path
//! - Unmatched paths fall through to the origin proxy rule

pub mod policy;
pub mod table;

pub use policy::{CachePolicy, LogPolicy, PathPattern, RouteAction, RouteRule};
pub use table::RouteTable;
