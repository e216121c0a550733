//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Preserve IDs supplied by trusted upstream hops
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Existing x-request-id headers are kept, not replaced

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that stamps requests with an x-request-id header.
#[derive(Debug, Clone, Copy)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper adding the request ID.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            // A hyphenated UUID is always a valid header value.
            let value = HeaderValue::from_str(&id).expect("uuid header value");
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn missing_id_is_generated() {
        let service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            Ok::<_, Infallible>(req)
        }));

        let request = Request::builder().body(Body::empty()).unwrap();
        let seen = service.oneshot(request).await.unwrap();

        let id = seen.headers().get(X_REQUEST_ID).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn existing_id_is_preserved() {
        let service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            Ok::<_, Infallible>(req)
        }));

        let request = Request::builder()
            .header(X_REQUEST_ID, "upstream-id")
            .body(Body::empty())
            .unwrap();
        let seen = service.oneshot(request).await.unwrap();

        assert_eq!(seen.headers().get(X_REQUEST_ID).unwrap(), "upstream-id");
    }
}
