//! Request forwarding to the origin process.
//!
//! # Responsibilities
//! - Rewrite request URIs to the origin's authority
//! - Apply the forwarding header policy
//! - Stream origin responses back unmodified
//! - Tunnel connection upgrades at the byte level
//! - Map origin failures to gateway statuses
//!
//! # Design Decisions
//! - Keep-alive reuse comes from the hyper client pool; the in-flight bound
//!   comes from the origin's semaphore, held until response headers arrive
//!   (or until an upgraded tunnel closes)
//! - Connect failures map to 502, any timeout to 504; no retries
//! - Hop-by-hop headers never cross the proxy in either direction

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use hyper::upgrade::OnUpgrade;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioIo};

use crate::config::TimeoutConfig;
use crate::http::headers;
use crate::upstream::{Origin, OriginPermit};

/// Forwards requests to the single configured origin.
pub struct OriginProxy {
    client: Client<HttpConnector, Body>,
    origin: Arc<Origin>,
    response_timeout: Duration,
}

impl OriginProxy {
    pub fn new(origin: Arc<Origin>, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .build(connector);

        Self {
            client,
            origin,
            response_timeout: Duration::from_secs(timeouts.response_secs),
        }
    }

    /// Forward a request and stream the origin's response back.
    pub async fn forward(&self, mut request: Request<Body>, client_ip: IpAddr) -> Response<Body> {
        let Some(permit) = self.origin.acquire().await else {
            tracing::error!(
                origin = %self.origin.authority(),
                "Origin pool exhausted past wait deadline"
            );
            return gateway_error(StatusCode::GATEWAY_TIMEOUT);
        };

        // Taken before the request is consumed; resolves once hyper switches
        // protocols on the client connection.
        let client_upgrade = request.extensions_mut().remove::<OnUpgrade>();
        let upgrade = headers::upgrade_token(request.headers());

        let (mut parts, body) = request.into_parts();
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(self.origin.scheme().clone());
        uri_parts.authority = Some(self.origin.authority().clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = match Uri::from_parts(uri_parts) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(error = %e, "Failed to rewrite request URI");
                return gateway_error(StatusCode::BAD_GATEWAY);
            }
        };

        headers::strip_hop_by_hop(&mut parts.headers);
        headers::apply_forwarding(&mut parts.headers, client_ip, upgrade.as_ref());

        let outbound = Request::from_parts(parts, body);
        let sent = tokio::time::timeout(self.response_timeout, self.client.request(outbound)).await;

        match sent {
            Err(_) => {
                tracing::error!(
                    origin = %self.origin.authority(),
                    timeout_secs = self.response_timeout.as_secs(),
                    "Origin response timed out"
                );
                gateway_error(StatusCode::GATEWAY_TIMEOUT)
            }
            Ok(Err(e)) => {
                tracing::error!(
                    origin = %self.origin.authority(),
                    connect = e.is_connect(),
                    error = %e,
                    "Origin request failed"
                );
                gateway_error(StatusCode::BAD_GATEWAY)
            }
            Ok(Ok(mut response)) => {
                if response.status() == StatusCode::SWITCHING_PROTOCOLS {
                    spawn_tunnel(client_upgrade, &mut response, permit);
                    // The 101 keeps its Connection/Upgrade headers.
                } else {
                    headers::strip_hop_by_hop(response.headers_mut());
                }
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
        }
    }
}

/// Bridge the two upgraded connections until either side closes. The origin
/// slot rides along so long-lived tunnels count against the pool.
fn spawn_tunnel(
    client_upgrade: Option<OnUpgrade>,
    response: &mut Response<hyper::body::Incoming>,
    permit: OriginPermit,
) {
    let Some(client_upgrade) = client_upgrade else {
        tracing::warn!("Origin switched protocols but client connection is not upgradeable");
        return;
    };
    let origin_upgrade = hyper::upgrade::on(response);

    tokio::spawn(async move {
        let _permit = permit;
        match tokio::try_join!(client_upgrade, origin_upgrade) {
            Ok((client_io, origin_io)) => {
                let mut client_io = TokioIo::new(client_io);
                let mut origin_io = TokioIo::new(origin_io);
                match tokio::io::copy_bidirectional(&mut client_io, &mut origin_io).await {
                    Ok((from_client, from_origin)) => {
                        tracing::debug!(from_client, from_origin, "Tunnel closed");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Tunnel closed with error");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Connection upgrade failed");
            }
        }
    });
}

fn gateway_error(status: StatusCode) -> Response<Body> {
    let text = match status {
        StatusCode::GATEWAY_TIMEOUT => "Gateway Timeout",
        _ => "Bad Gateway",
    };
    (status, text).into_response()
}
