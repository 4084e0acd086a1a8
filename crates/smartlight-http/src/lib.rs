//! smartlight-http: the dashboard-facing HTTP surface.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /status` | latest snapshot as JSON, always 200 |
//! | `GET /health` | plain-text liveness line |
//! | anything else | static file from the public directory (`/` → `index.html`) |
//!
//! CORS is fully permissive so the dashboard can be hosted elsewhere.

pub mod handlers;

use std::path::Path;

use axum::{routing::get, Router};
use smartlight_core::StatusQuery;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub status: StatusQuery,
}

impl AppState {
    pub fn new(status: StatusQuery) -> Self {
        Self { status }
    }
}

/// Build the application router. `public_dir` need not exist; requests for
/// missing assets get 404.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .fallback_service(ServeDir::new(public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` is cancelled, then drain.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "backend server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    info!("backend server stopped");
    Ok(())
}
