#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use pomolog::db::initialize::init_db;
use pomolog::server::{AppState, build_app};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn pomolog() -> Command {
    cargo_bin_cmd!("pomolog")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_pomolog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// An initialized in-memory connection for library-level tests.
pub fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().expect("open in-memory db");
    init_db(&conn).expect("init db");
    conn
}

/// Build a router backed by a temp directory holding both the database and
/// the received/ audit dir. Returns the router and the directory keeping the
/// files alive; open a second connection on `db_path` to inspect state.
pub fn test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = rusqlite::Connection::open(dir.path().join("pomolog.sqlite")).expect("open db");
    init_db(&conn).expect("init db");

    let state = AppState::new(conn, dir.path().join("received"));
    (build_app(state), dir)
}

pub fn inspect_conn(dir: &tempfile::TempDir) -> rusqlite::Connection {
    rusqlite::Connection::open(dir.path().join("pomolog.sqlite")).expect("open db")
}
