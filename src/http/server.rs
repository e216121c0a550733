//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all edge handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Classify each request against the route table
//! - Serve static files or forward to the origin
//! - Record metrics and access log entries per response
//!
//! # Design Decisions
//! - One handler, one table lookup; the rule decides everything else
//! - Access logging wraps the final response so every path is covered
//! - Graceful shutdown drains in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::Request;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::EdgeConfig;
use crate::http::proxy::OriginProxy;
use crate::http::request::RequestIdLayer;
use crate::http::statics::StaticFiles;
use crate::net::listener::{BoundedListener, ClientAddr};
use crate::observability::access_log::AccessLog;
use crate::observability::metrics;
use crate::routing::{RouteAction, RouteTable};
use crate::upstream::origin::{InvalidOrigin, Origin};

/// Application state injected into the edge handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub statics: Arc<StaticFiles>,
    pub proxy: Arc<OriginProxy>,
    pub access_log: AccessLog,
}

/// HTTP server for the edge router.
pub struct EdgeServer {
    router: Router,
    config: EdgeConfig,
}

impl EdgeServer {
    /// Create a new server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, InvalidOrigin> {
        let table = Arc::new(RouteTable::from_config(&config.routes));
        let statics = Arc::new(StaticFiles::from_config(&config.static_files));
        let origin = Arc::new(Origin::from_config(&config.origin)?);
        let proxy = Arc::new(OriginProxy::new(origin, &config.timeouts));

        let state = AppState {
            table,
            statics,
            proxy,
            access_log: AccessLog::from_config(&config.access_log),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(edge_handler))
            .route("/", any(edge_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: BoundedListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Edge router starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<ClientAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Edge router stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Main edge handler: classify the request, then serve or forward.
async fn edge_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<ClientAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let rule = state.table.lookup(&path);
    let entry = state.access_log.begin(&request, client.ip());

    tracing::debug!(
        client = %client,
        method = %method,
        path = %path,
        route = rule.action.kind(),
        "Dispatching request"
    );

    let response = match rule.action {
        RouteAction::ServeStatic => {
            // `serve` only inspects the request head (method, URI, headers) and
            // never reads the body. Drop the body so the borrow held across
            // `.await` is `Request<()>`, which is `Sync` (unlike `Request<Body>`,
            // whose body is not `Sync`) and keeps the handler future `Send`.
            let (parts, _body) = request.into_parts();
            let request = Request::from_parts(parts, ());
            state.statics.serve(&request, &rule).await
        }
        RouteAction::Proxy => {
            let mut response = state.proxy.forward(request, client.ip()).await;
            if let Some(value) = rule.cache.header_value() {
                response.headers_mut().insert(CACHE_CONTROL, value);
            }
            response
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        rule.action.kind(),
        start,
    );

    if rule.log.access {
        state.access_log.finish(entry, response)
    } else {
        response
    }
}
