use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Created first so migrations can
/// record themselves into it.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Create the `sessions` and `transitions` tables with the current schema.
fn create_ingest_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_key    INTEGER PRIMARY KEY,
            start_time     INTEGER,
            end_time       INTEGER,
            work_flavor    TEXT,
            work_duration  INTEGER,
            break_duration INTEGER,
            cancelled      INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transitions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_key INTEGER REFERENCES sessions(session_key),
            transition  TEXT NOT NULL DEFAULT '',
            event_time  INTEGER NOT NULL,
            raw_payload TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transitions_session ON transitions(session_key);
        CREATE INDEX IF NOT EXISTS idx_transitions_event_time ON transitions(event_time);
        "#,
    )?;
    Ok(())
}

/// Check whether a migration version was already recorded in the log table.
fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(stmt.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_migration_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Baseline schema migration. Idempotent: re-running against an already
/// initialized database is a no-op.
fn migrate_baseline(conn: &Connection) -> Result<()> {
    let version = "20260110_0001_baseline_ingest_schema";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    create_ingest_tables(conn)?;
    mark_migration_applied(conn, version, "Created sessions and transitions tables")?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db() and by `pomolog db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    migrate_baseline(conn)?;
    Ok(())
}
