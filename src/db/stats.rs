use crate::db::pool::DbPool;
use crate::ui::messages;
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("• File: {}", db_path);
    println!("• Size: {:.2} MB", file_mb);

    let sessions: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
    let transitions: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM transitions", [], |row| row.get(0))?;
    let unassociated: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM transitions WHERE session_key IS NULL",
        [],
        |row| row.get(0),
    )?;

    println!("• Sessions:      {}", sessions);
    println!("• Transitions:   {}", transitions);
    println!("• Unassociated:  {}", unassociated);

    let first: Option<i64> = pool
        .conn
        .query_row(
            "SELECT event_time FROM transitions ORDER BY event_time ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last: Option<i64> = pool
        .conn
        .query_row(
            "SELECT event_time FROM transitions ORDER BY event_time DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match (first, last) {
        (Some(f), Some(l)) => {
            println!("• Event time range:");
            println!("    from: {}", f);
            println!("    to:   {}", l);
        }
        _ => messages::info("No transitions recorded yet."),
    }

    println!();
    Ok(())
}
