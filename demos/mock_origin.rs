use axum::routing::get;
use axum::Json;
use axum::Router;
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", get(|| async { "Hello from the origin process! 🎈" }))
        .route(
            "/api/data",
            get(|| async { Json(serde_json::json!({ "items": [1, 2, 3] })) }),
        );

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Mock origin is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
