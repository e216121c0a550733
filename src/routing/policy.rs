//! Route rule types: path patterns and per-route policies.
//!
//! # Design Decisions
//! - Patterns are an explicit enum, not a precedence algorithm: exact and
//!   prefix rules are distinct types and the table orders them
//! - Prefix matching is whole-segment ("/static" matches "/static/app.js"
//!   but not "/staticfoo")
//! - Policies are plain data; rendering to headers happens once per response

use std::time::Duration;

use axum::http::HeaderValue;

/// A request path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches the path exactly.
    Exact(String),
    /// Matches the path itself or any nested path below it.
    Prefix(String),
}

impl PathPattern {
    /// Returns true if the request path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Prefix(p) => {
                if p == "/" {
                    return true;
                }
                match path.strip_prefix(p.as_str()) {
                    Some("") => true,
                    Some(rest) => rest.starts_with('/'),
                    None => false,
                }
            }
        }
    }
}

/// Client/CDN caching behavior attached to a route's responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Cache lifetime. None = emit no Cache-Control header.
    pub max_age: Option<Duration>,
    /// Content never changes under this path.
    pub immutable: bool,
}

impl CachePolicy {
    /// Render the policy as a Cache-Control header value, if it has one.
    pub fn header_value(&self) -> Option<HeaderValue> {
        let max_age = self.max_age?;
        let value = if self.immutable {
            format!("public, max-age={}, immutable", max_age.as_secs())
        } else {
            format!("public, max-age={}", max_age.as_secs())
        };
        // Only digits and fixed ASCII above, always a valid header value.
        Some(HeaderValue::from_str(&value).expect("cache-control value"))
    }
}

/// Per-route logging behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPolicy {
    /// Write an access log entry for requests on this route.
    pub access: bool,
    /// Log missing static files at error level.
    pub not_found: bool,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            access: true,
            not_found: true,
        }
    }
}

/// What the router does with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Serve a file from the document root.
    ServeStatic,
    /// Forward to the origin process.
    Proxy,
}

impl RouteAction {
    /// Label used for metrics and trace fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteAction::ServeStatic => "static",
            RouteAction::Proxy => "proxy",
        }
    }
}

/// A fully compiled route rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub action: RouteAction,
    pub cache: CachePolicy,
    pub log: LogPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_matches_only_itself() {
        let pattern = PathPattern::Exact("/favicon.ico".to_string());
        assert!(pattern.matches("/favicon.ico"));
        assert!(!pattern.matches("/favicon.ico/"));
        assert!(!pattern.matches("/favicon.icon"));
    }

    #[test]
    fn prefix_pattern_is_segment_aware() {
        let pattern = PathPattern::Prefix("/static".to_string());
        assert!(pattern.matches("/static"));
        assert!(pattern.matches("/static/logo.png"));
        assert!(pattern.matches("/static/css/site.css"));
        assert!(!pattern.matches("/staticfoo"));
        assert!(!pattern.matches("/stat"));
    }

    #[test]
    fn root_prefix_matches_everything() {
        let pattern = PathPattern::Prefix("/".to_string());
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn cache_policy_renders_immutable_assets() {
        let policy = CachePolicy {
            max_age: Some(Duration::from_secs(31_536_000)),
            immutable: true,
        };
        assert_eq!(
            policy.header_value().unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[test]
    fn empty_cache_policy_renders_nothing() {
        assert_eq!(CachePolicy::default().header_value(), None);
    }
}
