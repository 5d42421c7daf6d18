//! Unified application error type.
//! All modules (db, core, server, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Session {0} already exists")]
    DuplicateSession(i64),

    #[error("Session {0} not found")]
    SessionNotFound(i64),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Request body is not a JSON object")]
    MalformedBody,

    #[error("Missing or invalid event_time")]
    InvalidEventTime,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
