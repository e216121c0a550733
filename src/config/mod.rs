//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never mutated afterwards
//! - All fields have defaults so an empty file runs the stock deployment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AccessLogConfig, ActionKind, EdgeConfig, ListenerConfig, LogFormat, MatchKind,
    ObservabilityConfig, OriginConfig, RouteConfig, StaticConfig, TimeoutConfig,
};
