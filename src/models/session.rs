use chrono::Local;
use serde::Serialize;

/// One work/break cycle, keyed by the start-time token the device sends in
/// the URL. At most one row exists per key; rows are never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_key: i64,            // ⇔ sessions.session_key (INTEGER PRIMARY KEY)
    pub start_time: Option<i64>,     // ⇔ sessions.start_time
    pub end_time: Option<i64>,       // ⇔ sessions.end_time
    pub work_flavor: Option<String>, // ⇔ sessions.work_flavor
    pub work_duration: Option<i64>,  // ⇔ sessions.work_duration
    pub break_duration: Option<i64>, // ⇔ sessions.break_duration
    pub cancelled: bool,             // ⇔ sessions.cancelled (INT 0/1)
    pub created_at: String,          // ⇔ sessions.created_at (TEXT, ISO8601)
}

/// Field set for a fresh session row.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub session_key: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub work_flavor: Option<String>,
    pub work_duration: Option<i64>,
    pub cancelled: bool,
}

impl NewSession {
    pub fn created_at_now() -> String {
        Local::now().to_rfc3339()
    }
}

/// Partial update applied to an existing session. `None` leaves the stored
/// value untouched; fields never revert to unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub end_time: Option<i64>,
    pub work_flavor: Option<String>,
    pub work_duration: Option<i64>,
    pub break_duration: Option<i64>,
    pub set_cancelled: bool,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }
}
