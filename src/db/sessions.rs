//! Session store: keyed create-or-update storage over the `sessions` table.
//! No delete is exposed; sessions are permanent once created.

use crate::errors::{AppError, AppResult};
use crate::models::session::{NewSession, Session, SessionPatch};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn find(conn: &Connection, session_key: i64) -> AppResult<Option<Session>> {
    let mut stmt = conn.prepare_cached(
        "SELECT session_key, start_time, end_time, work_flavor,
                work_duration, break_duration, cancelled, created_at
         FROM sessions
         WHERE session_key = ?1",
    )?;

    let session = stmt.query_row([session_key], map_row).optional()?;
    Ok(session)
}

pub fn map_row(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        session_key: row.get("session_key")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        work_flavor: row.get("work_flavor")?,
        work_duration: row.get("work_duration")?,
        break_duration: row.get("break_duration")?,
        cancelled: row.get::<_, i64>("cancelled")? == 1,
        created_at: row.get("created_at")?,
    })
}

/// Insert a fresh session row. Fails with `DuplicateSession` if the key is
/// already taken; the reconciliation engine turns that race into an update.
pub fn create(conn: &Connection, new: &NewSession) -> AppResult<()> {
    let result = conn.execute(
        "INSERT INTO sessions
            (session_key, start_time, end_time, work_flavor, work_duration, cancelled, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.session_key,
            new.start_time,
            new.end_time,
            new.work_flavor,
            new.work_duration,
            if new.cancelled { 1 } else { 0 },
            NewSession::created_at_now(),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::DuplicateSession(new.session_key))
        }
        Err(e) => Err(e.into()),
    }
}

/// Apply a partial update to an existing session. `None` fields keep their
/// stored value, so a late or sparse event never clears what an earlier one
/// filled in. `cancelled` can only be raised, never cleared.
pub fn update(conn: &Connection, session_key: i64, patch: &SessionPatch) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE sessions SET
            end_time       = COALESCE(?2, end_time),
            work_flavor    = COALESCE(?3, work_flavor),
            work_duration  = COALESCE(?4, work_duration),
            break_duration = COALESCE(?5, break_duration),
            cancelled      = CASE WHEN ?6 THEN 1 ELSE cancelled END
         WHERE session_key = ?1",
        params![
            session_key,
            patch.end_time,
            patch.work_flavor,
            patch.work_duration,
            patch.break_duration,
            patch.set_cancelled,
        ],
    )?;

    if changed == 0 {
        return Err(AppError::SessionNotFound(session_key));
    }
    Ok(())
}

pub fn load_all(conn: &Connection) -> AppResult<Vec<Session>> {
    let mut stmt = conn.prepare(
        "SELECT session_key, start_time, end_time, work_flavor,
                work_duration, break_duration, cancelled, created_at
         FROM sessions
         ORDER BY session_key ASC",
    )?;

    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
