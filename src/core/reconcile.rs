//! Reconciliation engine.
//!
//! Sole arbiter of how a validated event mutates the session store and what
//! gets written to the event log. Events arrive independently and may be
//! reordered, duplicated, or missing their start event entirely, so every
//! work-ending transition must be able to conjure the session row it belongs
//! to: the key is the session's own start time, which every notification
//! carries in its URL.

use crate::core::validate::Envelope;
use crate::db::{events, sessions};
use crate::errors::{AppError, AppResult};
use crate::models::session::{NewSession, Session, SessionPatch};
use crate::models::transition::TransitionKind;
use rusqlite::Connection;
use serde_json::{Map, Value};

/// What a transition wants done to the session store.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert a fresh row; `on_race` is applied as an update instead when a
    /// concurrent create for the same key wins.
    Create {
        new: NewSession,
        on_race: SessionPatch,
    },
    Update(SessionPatch),
    Skip,
}

/// Whether the logged event gets linked to the session row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// The transition itself guarantees a session exists after step 2.
    Always,
    /// Link only if a session already existed; otherwise log unassociated.
    ExistingOnly,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub mutation: Mutation,
    pub association: Association,
}

/// The per-variant policy table. One uniform contract instead of scattered
/// create-or-update branches: given the existing session (if any), each
/// transition decides its mutation and whether the event associates.
pub fn decide(
    kind: &TransitionKind,
    session_key: i64,
    event_time: i64,
    payload: &Map<String, Value>,
    existing: Option<&Session>,
) -> Decision {
    match kind {
        // Begins (or re-begins) a work period. start_time is immutable once
        // set; a repeated start only refreshes the flavor label.
        TransitionKind::IdleToWork => {
            let flavor = work_flavor(payload);
            let mutation = if existing.is_some() {
                Mutation::Update(SessionPatch {
                    work_flavor: Some(flavor),
                    ..Default::default()
                })
            } else {
                Mutation::Create {
                    new: NewSession {
                        session_key,
                        start_time: Some(session_key),
                        work_flavor: Some(flavor.clone()),
                        ..Default::default()
                    },
                    on_race: SessionPatch {
                        work_flavor: Some(flavor),
                        ..Default::default()
                    },
                }
            };
            Decision {
                mutation,
                association: Association::Always,
            }
        }

        // Ends a work period, either into a break or by cancellation. If the
        // start event was lost, the row is created on the spot with only
        // timestamps, no flavor.
        TransitionKind::WorkToBreak | TransitionKind::WorkToIdle => {
            let cancelled = *kind == TransitionKind::WorkToIdle;
            let duration_field = if cancelled {
                "cancelled_work_duration"
            } else {
                "work_duration"
            };
            let work_duration = int_field(payload, duration_field);

            let patch = SessionPatch {
                end_time: Some(event_time),
                work_duration,
                set_cancelled: cancelled,
                ..Default::default()
            };
            let mutation = if existing.is_some() {
                Mutation::Update(patch)
            } else {
                Mutation::Create {
                    new: NewSession {
                        session_key,
                        start_time: Some(session_key),
                        end_time: Some(event_time),
                        work_duration,
                        cancelled,
                        ..Default::default()
                    },
                    on_race: patch,
                }
            };
            Decision {
                mutation,
                association: Association::Always,
            }
        }

        // Ends a break. Never creates a session: with no row to attach to,
        // the event is still logged, just unassociated.
        TransitionKind::BreakToIdle => {
            let mutation = match (existing, int_field(payload, "break_duration")) {
                (Some(_), break_duration) => Mutation::Update(SessionPatch {
                    break_duration,
                    ..Default::default()
                }),
                (None, _) => Mutation::Skip,
            };
            Decision {
                mutation,
                association: Association::ExistingOnly,
            }
        }

        // Pass-through: logged against the session if one is found.
        TransitionKind::Unrecognized => Decision {
            mutation: Mutation::Skip,
            association: Association::ExistingOnly,
        },
    }
}

/// Fold one validated event into the store and append it to the event log.
/// Returns the session key the logged event was associated with, if any.
///
/// The caller serializes invocations per session key; within that, a
/// `DuplicateSession` from a lost create race is retried as an update and
/// never surfaced.
pub fn reconcile(conn: &Connection, session_key: i64, envelope: &Envelope) -> AppResult<Option<i64>> {
    let existing = sessions::find(conn, session_key)?;
    let decision = decide(
        &envelope.kind,
        session_key,
        envelope.event_time,
        &envelope.payload,
        existing.as_ref(),
    );

    match decision.mutation {
        Mutation::Create { new, on_race } => match sessions::create(conn, &new) {
            Ok(()) => {}
            Err(AppError::DuplicateSession(_)) => {
                sessions::update(conn, session_key, &on_race)?;
            }
            Err(e) => return Err(e),
        },
        Mutation::Update(patch) => {
            if !patch.is_empty() {
                sessions::update(conn, session_key, &patch)?;
            }
        }
        Mutation::Skip => {}
    }

    let associated = match decision.association {
        Association::Always => Some(session_key),
        Association::ExistingOnly => existing.as_ref().map(|s| s.session_key),
    };

    events::append(
        conn,
        associated,
        &envelope.transition,
        envelope.event_time,
        &envelope.raw_body,
    )?;

    Ok(associated)
}

/// `work_flavor` from the payload. The device labels flavor 0 as the string
/// "0", so that literal doubles as the unknown-flavor default when the field
/// is absent or null. Non-string values are carried as their JSON text.
fn work_flavor(payload: &Map<String, Value>) -> String {
    match payload.get("work_flavor") {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Optional non-negative integer field, accepting the same digit-string
/// coercion as event_time. Anything else, including a negative number,
/// counts as absent; durations can never go below zero.
fn int_field(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key) {
        Some(Value::Number(n)) => n.as_i64().filter(|v| *v >= 0),
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn dummy_session(key: i64) -> Session {
        Session {
            session_key: key,
            start_time: Some(key),
            end_time: None,
            work_flavor: Some("0".to_string()),
            work_duration: None,
            break_duration: None,
            cancelled: false,
            created_at: String::new(),
        }
    }

    #[test]
    fn idle_to_work_creates_with_flavor() {
        let p = payload(json!({"work_flavor": "deep"}));
        let d = decide(&TransitionKind::IdleToWork, 1000, 1000, &p, None);
        match d.mutation {
            Mutation::Create { new, .. } => {
                assert_eq!(new.start_time, Some(1000));
                assert_eq!(new.work_flavor.as_deref(), Some("deep"));
                assert!(!new.cancelled);
            }
            other => panic!("expected create, got {:?}", other),
        }
        assert_eq!(d.association, Association::Always);
    }

    #[test]
    fn idle_to_work_defaults_flavor_to_zero() {
        let p = payload(json!({}));
        let d = decide(&TransitionKind::IdleToWork, 1, 1, &p, None);
        let Mutation::Create { new, .. } = d.mutation else {
            panic!("expected create");
        };
        assert_eq!(new.work_flavor.as_deref(), Some("0"));
    }

    #[test]
    fn idle_to_work_coerces_null_and_numeric_flavor() {
        let p = payload(json!({"work_flavor": null}));
        let Mutation::Create { new, .. } = decide(&TransitionKind::IdleToWork, 1, 1, &p, None).mutation
        else {
            panic!("expected create");
        };
        assert_eq!(new.work_flavor.as_deref(), Some("0"));

        let p = payload(json!({"work_flavor": 2}));
        let Mutation::Create { new, .. } = decide(&TransitionKind::IdleToWork, 1, 1, &p, None).mutation
        else {
            panic!("expected create");
        };
        assert_eq!(new.work_flavor.as_deref(), Some("2"));
    }

    #[test]
    fn idle_to_work_on_existing_only_touches_flavor() {
        let p = payload(json!({"work_flavor": "writing"}));
        let existing = dummy_session(5);
        let d = decide(&TransitionKind::IdleToWork, 5, 9, &p, Some(&existing));
        match d.mutation {
            Mutation::Update(patch) => {
                assert_eq!(patch.work_flavor.as_deref(), Some("writing"));
                assert_eq!(patch.end_time, None);
                assert!(!patch.set_cancelled);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn work_to_break_creates_bare_session_when_start_lost() {
        let p = payload(json!({"work_duration": 500}));
        let d = decide(&TransitionKind::WorkToBreak, 1000, 1500, &p, None);
        let Mutation::Create { new, on_race } = d.mutation else {
            panic!("expected create");
        };
        assert_eq!(new.start_time, Some(1000));
        assert_eq!(new.end_time, Some(1500));
        assert_eq!(new.work_duration, Some(500));
        assert_eq!(new.work_flavor, None);
        assert_eq!(on_race.end_time, Some(1500));
        assert_eq!(d.association, Association::Always);
    }

    #[test]
    fn work_to_break_missing_duration_stays_unset() {
        let p = payload(json!({}));
        let Mutation::Create { new, .. } =
            decide(&TransitionKind::WorkToBreak, 1, 2, &p, None).mutation
        else {
            panic!("expected create");
        };
        assert_eq!(new.work_duration, None);
    }

    #[test]
    fn negative_durations_count_as_absent() {
        let p = payload(json!({"work_duration": -500}));
        let Mutation::Create { new, .. } =
            decide(&TransitionKind::WorkToBreak, 1000, 1500, &p, None).mutation
        else {
            panic!("expected create");
        };
        assert_eq!(new.work_duration, None);

        let p = payload(json!({"cancelled_work_duration": -1}));
        let Mutation::Create { new, .. } =
            decide(&TransitionKind::WorkToIdle, 1000, 1500, &p, None).mutation
        else {
            panic!("expected create");
        };
        assert_eq!(new.work_duration, None);

        let p = payload(json!({"break_duration": -30}));
        let existing = dummy_session(1000);
        let Mutation::Update(patch) =
            decide(&TransitionKind::BreakToIdle, 1000, 1800, &p, Some(&existing)).mutation
        else {
            panic!("expected update");
        };
        assert_eq!(patch.break_duration, None);
    }

    #[test]
    fn work_to_idle_reads_cancelled_duration_and_flags() {
        let p = payload(json!({"cancelled_work_duration": 120}));
        let d = decide(&TransitionKind::WorkToIdle, 1000, 1120, &p, None);
        let Mutation::Create { new, on_race } = d.mutation else {
            panic!("expected create");
        };
        assert!(new.cancelled);
        assert_eq!(new.work_duration, Some(120));
        assert!(on_race.set_cancelled);
    }

    #[test]
    fn break_to_idle_never_creates() {
        let p = payload(json!({"break_duration": 300}));
        let d = decide(&TransitionKind::BreakToIdle, 1000, 1800, &p, None);
        assert!(matches!(d.mutation, Mutation::Skip));
        assert_eq!(d.association, Association::ExistingOnly);
    }

    #[test]
    fn break_to_idle_updates_existing() {
        let p = payload(json!({"break_duration": 300}));
        let existing = dummy_session(1000);
        let d = decide(&TransitionKind::BreakToIdle, 1000, 1800, &p, Some(&existing));
        let Mutation::Update(patch) = d.mutation else {
            panic!("expected update");
        };
        assert_eq!(patch.break_duration, Some(300));
        assert_eq!(patch.end_time, None);
    }

    #[test]
    fn unrecognized_is_pure_passthrough() {
        let p = payload(json!({}));
        let d = decide(&TransitionKind::Unrecognized, 7, 7, &p, None);
        assert!(matches!(d.mutation, Mutation::Skip));
        assert_eq!(d.association, Association::ExistingOnly);
    }
}
