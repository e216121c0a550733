//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge
//! router. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Origin process the router forwards non-static requests to.
    pub origin: OriginConfig,

    /// Static file serving configuration.
    pub static_files: StaticConfig,

    /// Ordered route rules. Exact-match rules take precedence over prefix
    /// rules; any request matching no rule is proxied to the origin.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Access log settings.
    pub access_log: AccessLogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            origin: OriginConfig::default(),
            static_files: StaticConfig::default(),
            routes: default_routes(),
            timeouts: TimeoutConfig::default(),
            access_log: AccessLogConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Origin process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin process (e.g., "http://127.0.0.1:3000").
    pub url: String,

    /// Maximum in-flight requests to the origin.
    pub pool_size: usize,

    /// How long a request waits for a free origin slot before failing
    /// with 504, in milliseconds.
    pub pool_wait_ms: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            pool_size: 64,
            pool_wait_ms: 1_000,
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Document root that static routes are resolved against.
    pub root: PathBuf,

    /// File served when a request path resolves to a directory.
    pub index_file: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public"),
            index_file: "index.html".to_string(),
        }
    }
}

/// How a route pattern is matched against the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The pattern must equal the request path.
    Exact,
    /// The pattern must be a whole-segment prefix of the request path.
    #[default]
    Prefix,
}

/// What to do with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Serve a file from the document root.
    Static,
    /// Forward to the origin process.
    Proxy,
}

/// A single route rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Request path pattern (must start with '/').
    pub pattern: String,

    /// Exact or prefix matching.
    #[serde(rename = "match", default)]
    pub match_kind: MatchKind,

    /// Serve static or proxy to origin.
    pub action: ActionKind,

    /// Cache-Control max-age in seconds. Omitted = no Cache-Control header.
    #[serde(default)]
    pub max_age_secs: Option<u64>,

    /// Mark cached responses immutable.
    #[serde(default)]
    pub immutable: bool,

    /// Write access log entries for this route.
    #[serde(default = "default_true")]
    pub access_log: bool,

    /// Log missing static files at error level. Disable for paths that
    /// browsers probe unconditionally.
    #[serde(default = "default_true")]
    pub log_not_found: bool,
}

fn default_true() -> bool {
    true
}

const ASSET_MAX_AGE_SECS: u64 = 31_536_000;

/// The stock deployment route table: pre-rendered assets are served with a
/// one-year immutable cache and no access logging, icon/robots probes are
/// kept out of the logs, everything else goes to the origin.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            pattern: "/favicon.ico".to_string(),
            match_kind: MatchKind::Exact,
            action: ActionKind::Static,
            max_age_secs: Some(ASSET_MAX_AGE_SECS),
            immutable: true,
            access_log: false,
            log_not_found: false,
        },
        RouteConfig {
            pattern: "/robots.txt".to_string(),
            match_kind: MatchKind::Exact,
            action: ActionKind::Static,
            max_age_secs: None,
            immutable: false,
            access_log: false,
            log_not_found: true,
        },
        RouteConfig {
            pattern: "/_next/static".to_string(),
            match_kind: MatchKind::Prefix,
            action: ActionKind::Static,
            max_age_secs: Some(ASSET_MAX_AGE_SECS),
            immutable: true,
            access_log: false,
            log_not_found: true,
        },
        RouteConfig {
            pattern: "/static".to_string(),
            match_kind: MatchKind::Prefix,
            action: ActionKind::Static,
            max_age_secs: Some(ASSET_MAX_AGE_SECS),
            immutable: true,
            access_log: false,
            log_not_found: true,
        },
    ]
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Origin connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the origin to produce response headers, in seconds.
    /// Elapsing maps to 504 Gateway Timeout.
    pub response_secs: u64,

    /// Outer per-request guard applied by the server, in seconds. Kept well
    /// above `response_secs` so origin timeouts surface as 504, not 408.
    pub request_secs: u64,

    /// Idle keep-alive timeout for pooled origin connections in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            response_secs: 30,
            request_secs: 75,
            idle_secs: 90,
        }
    }
}

/// Access log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Combined Log Format plus the forwarded-for chain.
    #[default]
    Combined,
    /// One JSON object per line.
    Json,
}

/// Access log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Master switch; per-route suppression still applies when enabled.
    pub enabled: bool,

    /// Output format.
    pub format: LogFormat,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Combined,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_runs_stock_deployment() {
        let config: EdgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.origin.pool_size, 64);
        assert_eq!(config.routes.len(), 4);
    }

    #[test]
    fn default_table_covers_deployment_paths() {
        let routes = default_routes();

        let favicon = &routes[0];
        assert_eq!(favicon.pattern, "/favicon.ico");
        assert_eq!(favicon.match_kind, MatchKind::Exact);
        assert!(!favicon.access_log);
        assert!(!favicon.log_not_found);
        assert!(favicon.immutable);

        let robots = &routes[1];
        assert_eq!(robots.match_kind, MatchKind::Exact);
        assert!(!robots.access_log);
        assert!(robots.log_not_found);
        assert_eq!(robots.max_age_secs, None);

        for assets in &routes[2..] {
            assert_eq!(assets.match_kind, MatchKind::Prefix);
            assert_eq!(assets.max_age_secs, Some(31_536_000));
            assert!(assets.immutable);
            assert!(!assets.access_log);
        }
    }

    #[test]
    fn route_rule_parses_from_toml() {
        let config: EdgeConfig = toml::from_str(
            r#"
            [origin]
            url = "http://127.0.0.1:4000"

            [[routes]]
            pattern = "/assets"
            match = "prefix"
            action = "static"
            max_age_secs = 86400
            immutable = true
            access_log = false
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.url, "http://127.0.0.1:4000");
        assert_eq!(config.routes.len(), 1);
        let rule = &config.routes[0];
        assert_eq!(rule.action, ActionKind::Static);
        assert_eq!(rule.max_age_secs, Some(86_400));
        assert!(rule.log_not_found);
    }
}
