use crate::signaling::{MessageRouter, SessionManager};
use crate::transport::ws_handler;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// `/ws` for signaling, `/health` for probes, everything else from
/// `static_dir`.
pub fn build_app(sessions: SessionManager, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
        .with_state(MessageRouter::new(sessions))
}

/// Serve `app` with each connection's peer address available to handlers.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn health() -> &'static str {
    "OK"
}
