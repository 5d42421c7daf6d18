//! Append-only event log over the `transitions` table.

use crate::errors::AppResult;
use crate::models::event::TransitionEvent;
use chrono::Local;
use rusqlite::{Connection, Row, params};

/// Append one accepted transition. `session_key` is NULL when the event
/// could not be associated with a session.
pub fn append(
    conn: &Connection,
    session_key: Option<i64>,
    transition: &str,
    event_time: i64,
    raw_payload: &str,
) -> AppResult<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transitions (session_key, transition, event_time, raw_payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    stmt.execute(params![
        session_key,
        transition,
        event_time,
        raw_payload,
        Local::now().to_rfc3339(),
    ])?;

    Ok(conn.last_insert_rowid())
}

pub fn map_row(row: &Row) -> rusqlite::Result<TransitionEvent> {
    Ok(TransitionEvent {
        id: row.get("id")?,
        session_key: row.get("session_key")?,
        transition: row.get("transition")?,
        event_time: row.get("event_time")?,
        raw_payload: row.get("raw_payload")?,
        created_at: row.get("created_at")?,
    })
}

pub fn load_all(conn: &Connection) -> AppResult<Vec<TransitionEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_key, transition, event_time, raw_payload, created_at
         FROM transitions
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_by_session(conn: &Connection, session_key: i64) -> AppResult<Vec<TransitionEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_key, transition, event_time, raw_payload, created_at
         FROM transitions
         WHERE session_key = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([session_key], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
