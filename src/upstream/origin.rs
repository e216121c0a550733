//! Origin endpoint abstraction.
//!
//! # Responsibilities
//! - Hold the origin's resolved scheme and authority for URI rewriting
//! - Bound concurrent in-flight requests with a semaphore
//! - Hand out RAII permits that release the slot on drop

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::uri::{Authority, Scheme};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

use crate::config::OriginConfig;

/// Error constructing an origin from configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid origin url {url:?}: {reason}")]
pub struct InvalidOrigin {
    pub url: String,
    pub reason: String,
}

/// The single origin process behind this edge router.
#[derive(Debug)]
pub struct Origin {
    authority: Authority,
    scheme: Scheme,
    slots: Arc<Semaphore>,
    wait_timeout: Duration,
}

impl Origin {
    /// Build an origin from configuration.
    pub fn from_config(config: &OriginConfig) -> Result<Self, InvalidOrigin> {
        let url = Url::parse(&config.url).map_err(|e| InvalidOrigin {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let host = url.host_str().ok_or_else(|| InvalidOrigin {
            url: config.url.clone(),
            reason: "missing host".to_string(),
        })?;
        let port = url.port_or_known_default().unwrap_or(80);
        let authority = Authority::from_str(&format!("{host}:{port}")).map_err(|e| {
            InvalidOrigin {
                url: config.url.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            authority,
            scheme: Scheme::HTTP,
            slots: Arc::new(Semaphore::new(config.pool_size)),
            wait_timeout: Duration::from_millis(config.pool_wait_ms),
        })
    }

    /// The origin's host:port for URI rewriting.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// The scheme requests to the origin use.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Acquire an in-flight slot, waiting at most the configured bound.
    /// Returns None when the pool stays exhausted past the deadline.
    pub async fn acquire(&self) -> Option<OriginPermit> {
        let acquired =
            tokio::time::timeout(self.wait_timeout, Arc::clone(&self.slots).acquire_owned()).await;
        match acquired {
            Ok(Ok(permit)) => Some(OriginPermit { _permit: permit }),
            // Semaphore is never closed while the origin is alive.
            Ok(Err(_)) => None,
            Err(_) => None,
        }
    }

    /// Currently free in-flight slots.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

/// A slot for one in-flight origin request. Dropping it frees the slot.
#[derive(Debug)]
pub struct OriginPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_with(pool_size: usize, wait_ms: u64) -> Origin {
        Origin::from_config(&OriginConfig {
            url: "http://127.0.0.1:3000".to_string(),
            pool_size,
            pool_wait_ms: wait_ms,
        })
        .unwrap()
    }

    #[test]
    fn authority_includes_default_port() {
        let origin = Origin::from_config(&OriginConfig {
            url: "http://origin.internal".to_string(),
            pool_size: 1,
            pool_wait_ms: 10,
        })
        .unwrap();
        assert_eq!(origin.authority().as_str(), "origin.internal:80");
    }

    #[tokio::test]
    async fn permits_bound_in_flight_requests() {
        let origin = origin_with(2, 10);
        let first = origin.acquire().await.unwrap();
        let _second = origin.acquire().await.unwrap();
        assert_eq!(origin.available_slots(), 0);

        // Pool exhausted: the bounded wait elapses.
        assert!(origin.acquire().await.is_none());

        drop(first);
        assert!(origin.acquire().await.is_some());
    }
}
