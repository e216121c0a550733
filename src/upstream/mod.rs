//! Origin upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy request
//!     → origin.rs (acquire in-flight slot, bounded wait)
//!     → hyper client forwards over keep-alive pool
//!     → slot released when the RAII permit drops
//! ```
//!
//! # Design Decisions
//! - Single origin endpoint; no groups, no load balancing
//! - In-flight bound enforced by semaphore, not by the client pool
//! - Slot wait is bounded; exhaustion surfaces as 504, never unbounded blocking

pub mod origin;

pub use origin::{Origin, OriginPermit};
