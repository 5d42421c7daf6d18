use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::db::{events, sessions};
use crate::errors::AppResult;
use crate::models::event::TransitionEvent;
use crate::models::session::Session;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        events: events_only,
        session,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;

        if *events_only {
            let rows = match session {
                Some(key) => events::load_by_session(&pool.conn, *key)?,
                None => events::load_all(&pool.conn)?,
            };
            if rows.is_empty() {
                println!("No transitions recorded.");
            } else {
                print_events(&rows);
            }
        } else {
            let rows = sessions::load_all(&pool.conn)?;
            if rows.is_empty() {
                println!("No sessions recorded.");
            } else {
                print_sessions(&rows);
            }
        }
    }
    Ok(())
}

fn print_sessions(rows: &[Session]) {
    println!(
        "{:>12} {:>12} {:>12} {:>10} {:>8} {:>8} {:>9}",
        "KEY", "START", "END", "FLAVOR", "WORK", "BREAK", "CANCELLED"
    );
    for s in rows {
        println!(
            "{:>12} {:>12} {:>12} {:>10} {:>8} {:>8} {:>9}",
            s.session_key,
            opt(s.start_time),
            opt(s.end_time),
            s.work_flavor.as_deref().unwrap_or("-"),
            opt(s.work_duration),
            opt(s.break_duration),
            if s.cancelled { "yes" } else { "no" },
        );
    }
}

fn print_events(rows: &[TransitionEvent]) {
    println!(
        "{:>6} {:>12} {:>15} {:>12}  {}",
        "ID", "SESSION", "TRANSITION", "EVENT_TIME", "PAYLOAD"
    );
    for e in rows {
        println!(
            "{:>6} {:>12} {:>15} {:>12}  {}",
            e.id,
            opt(e.session_key),
            if e.transition.is_empty() {
                "-"
            } else {
                &e.transition
            },
            e.event_time,
            e.raw_payload,
        );
    }
}

fn opt(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}
