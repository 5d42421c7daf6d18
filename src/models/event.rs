use serde::Serialize;

/// One accepted transition, exactly as ingested. Rows are append-only; the
/// event log owns them and only references sessions.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEvent {
    pub id: i64,                  // ⇔ transitions.id (AUTOINCREMENT)
    pub session_key: Option<i64>, // ⇔ transitions.session_key (NULL if unassociated)
    pub transition: String,       // ⇔ transitions.transition (raw string, '' if absent)
    pub event_time: i64,          // ⇔ transitions.event_time
    pub raw_payload: String,      // ⇔ transitions.raw_payload (verbatim JSON)
    pub created_at: String,       // ⇔ transitions.created_at (TEXT, ISO8601)
}
