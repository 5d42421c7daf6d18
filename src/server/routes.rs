use axum::{
    Json,
    body::Bytes,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{audit, reconcile, validate};
use crate::core::validate::Envelope;
use crate::db::log::ttlog;
use crate::server::app::AppState;

/// Ingestion endpoint: `POST /pomodoros/{session_key}/transitions`.
///
/// Only validation failures are caller-visible. Once the body passes
/// validation the event is accepted: storage failures are logged for the
/// operator, never bounced back to the device, which would otherwise retry
/// the same payload from its SD queue forever.
pub async fn ingest_transition(
    State(state): State<AppState>,
    UrlPath(raw_key): UrlPath<String>,
    body: Bytes,
) -> Response {
    // Routing owns the digit-only constraint; anything else is an unmatched
    // path, not a bad request.
    let Some(session_key) = validate::parse_session_key(&raw_key) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"}))).into_response();
    };

    let envelope = match validate::parse_envelope(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()})))
                .into_response();
        }
    };

    // Serialize find → mutate → append per key; unrelated keys proceed.
    let _guard = state.locks.acquire(session_key).await;

    let conn = state.conn.clone();
    let dir = state.received_dir.clone();
    let task =
        tokio::task::spawn_blocking(move || persist_event(&conn, &dir, session_key, &envelope))
            .await;
    if let Err(e) = task {
        tracing::error!(session_key, error = %e, "ingest task failed");
    }

    (StatusCode::CREATED, Json(json!({"status": "ok"}))).into_response()
}

/// Durable part of ingestion: audit artifact first, then reconciliation.
/// Each sink fails independently; a failure in one must not starve the other.
/// The audit write happens before the connection mutex is taken so file I/O
/// for one key never stalls database work for unrelated keys.
fn persist_event(
    conn: &Arc<Mutex<Connection>>,
    received_dir: &Path,
    session_key: i64,
    envelope: &Envelope,
) {
    let audit_result =
        audit::write_received(received_dir, session_key, envelope.event_time, &envelope.payload);

    let conn = lock_conn(conn);

    if let Err(e) = audit_result {
        tracing::error!(session_key, error = %e, "audit artifact write failed");
        let _ = ttlog(
            &conn,
            "storage_failure",
            &session_key.to_string(),
            &format!("audit write failed: {}", e),
        );
    }

    match reconcile::reconcile(&conn, session_key, envelope) {
        Ok(associated) => {
            tracing::info!(
                session_key,
                transition = %envelope.transition,
                event_time = envelope.event_time,
                associated = associated.is_some(),
                "transition accepted"
            );
        }
        Err(e) => {
            tracing::error!(session_key, error = %e, "reconciliation failed");
            let _ = ttlog(
                &conn,
                "storage_failure",
                &session_key.to_string(),
                &format!("reconcile failed: {}", e),
            );
        }
    }
}

fn lock_conn(conn: &Arc<Mutex<Connection>>) -> MutexGuard<'_, Connection> {
    // A poisoned mutex only means a previous statement panicked; the
    // connection itself is still usable.
    match conn.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
}

/// Liveness endpoint: verifies the database still answers.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let conn = state.conn.clone();
    let db_ok = tokio::task::spawn_blocking(move || {
        let conn = lock_conn(&conn);
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    })
    .await
    .unwrap_or(false);

    let (code, status) = if db_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database: if db_ok { "ok" } else { "error" }.to_string(),
        }),
    )
}
