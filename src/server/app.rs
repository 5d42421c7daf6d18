//! Application setup and router configuration.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    routing::{get, post},
};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use crate::server::locks::KeyLocks;
use crate::server::routes::{health_handler, ingest_transition};

/// Shared application state. The single SQLite connection is guarded by a
/// mutex held only for database work, never across file I/O; request-level
/// ordering is the job of the per-key locks.
#[derive(Clone)]
pub struct AppState {
    pub conn: Arc<Mutex<Connection>>,
    pub locks: Arc<KeyLocks>,
    pub received_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(conn: Connection, received_dir: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            locks: Arc::new(KeyLocks::new()),
            received_dir: Arc::new(received_dir),
        }
    }
}

/// Build the Axum application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Trailing slash optional on the ingestion route
        .route("/pomodoros/:session_key/transitions", post(ingest_transition))
        .route(
            "/pomodoros/:session_key/transitions/",
            post(ingest_transition),
        )
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
