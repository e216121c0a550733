//! Route lookup.
//!
//! # Responsibilities
//! - Compile route rules from configuration
//! - Look up the matching rule for a request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap, O(n) longest-first prefix scan
//! - Every path matches: unmatched requests get the default proxy rule

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{ActionKind, MatchKind, RouteConfig};
use crate::routing::policy::{CachePolicy, LogPolicy, PathPattern, RouteAction, RouteRule};

/// Compiled, immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    exact: HashMap<String, Arc<RouteRule>>,
    /// Prefix rules sorted longest pattern first.
    prefixes: Vec<Arc<RouteRule>>,
    default_rule: Arc<RouteRule>,
}

impl RouteTable {
    /// Compile a table from configuration rules.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let mut exact = HashMap::new();
        let mut prefixes = Vec::new();

        for route in routes {
            let rule = Arc::new(compile_rule(route));
            match route.match_kind {
                MatchKind::Exact => {
                    exact.insert(route.pattern.clone(), rule);
                }
                MatchKind::Prefix => prefixes.push(rule),
            }
        }

        prefixes.sort_by_key(|rule| {
            std::cmp::Reverse(match &rule.pattern {
                PathPattern::Prefix(p) => p.len(),
                PathPattern::Exact(p) => p.len(),
            })
        });

        Self {
            exact,
            prefixes,
            default_rule: Arc::new(RouteRule {
                pattern: PathPattern::Prefix("/".to_string()),
                action: RouteAction::Proxy,
                cache: CachePolicy::default(),
                log: LogPolicy::default(),
            }),
        }
    }

    /// Find the rule for a request path. Exact rules win over prefix rules,
    /// longer prefixes over shorter; anything else proxies to the origin.
    pub fn lookup(&self, path: &str) -> Arc<RouteRule> {
        if let Some(rule) = self.exact.get(path) {
            return Arc::clone(rule);
        }
        for rule in &self.prefixes {
            if rule.pattern.matches(path) {
                return Arc::clone(rule);
            }
        }
        Arc::clone(&self.default_rule)
    }
}

fn compile_rule(route: &RouteConfig) -> RouteRule {
    let pattern = match route.match_kind {
        MatchKind::Exact => PathPattern::Exact(route.pattern.clone()),
        MatchKind::Prefix => PathPattern::Prefix(route.pattern.clone()),
    };
    let action = match route.action {
        ActionKind::Static => RouteAction::ServeStatic,
        ActionKind::Proxy => RouteAction::Proxy,
    };
    RouteRule {
        pattern,
        action,
        cache: CachePolicy {
            max_age: route.max_age_secs.map(Duration::from_secs),
            immutable: route.immutable,
        },
        log: LogPolicy {
            access: route.access_log,
            not_found: route.log_not_found,
        },
    }
}
