use crate::db::{self, Database};
use crate::shortener::Allocator;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub allocator: Arc<Allocator>,
}

mod errors;
mod handlers;

pub use errors::AppError;

/// Build the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/shorten", post(handlers::shorten))
        .route("/go/{short_path}", get(handlers::redirect))
        .route("/api/links", get(handlers::list_links))
        .route("/api/links/{short_path}", get(handlers::get_link))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server on the given address.
pub async fn serve(db_path: &std::path::Path, host: &str, port: u16) -> Result<(), String> {
    let db = Database::open(db_path).map_err(|e| e.to_string())?;
    db.migrate().map_err(|e| e.to_string())?;
    let allocator = db::allocator_for(db).map_err(|e| e.to_string())?;
    let state = AppState {
        allocator: Arc::new(allocator),
    };
    let app = create_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind to {addr}: {e}"))?;
    tracing::info!(%addr, db = %db_path.display(), "server started");
    println!("wordlink listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}
