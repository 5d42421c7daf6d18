//! Event envelope validation.
//!
//! Only two things are checked here: the body must be a JSON object and it
//! must carry a usable `event_time`. Everything else is forwarded opaque to
//! the reconciliation engine; unknown fields are legal and preserved.

use crate::errors::{AppError, AppResult};
use crate::models::transition::TransitionKind;
use serde_json::{Map, Value};

/// A validated transition payload, still carrying the verbatim body for the
/// audit artifact and the event log.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub event_time: i64,
    pub kind: TransitionKind,
    /// Raw `transition` field, pass-through ('' when absent).
    pub transition: String,
    pub payload: Map<String, Value>,
    pub raw_body: String,
}

pub fn parse_envelope(body: &[u8]) -> AppResult<Envelope> {
    let value: Value = serde_json::from_slice(body).map_err(|_| AppError::MalformedBody)?;
    let Value::Object(payload) = value else {
        return Err(AppError::MalformedBody);
    };

    let event_time = coerce_event_time(payload.get("event_time"))?;

    let transition = payload
        .get("transition")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let kind = TransitionKind::from_raw(payload.get("transition").and_then(Value::as_str));

    // from_slice already proved the body is valid UTF-8 JSON
    let raw_body = String::from_utf8_lossy(body).into_owned();

    Ok(Envelope {
        event_time,
        kind,
        transition,
        payload,
        raw_body,
    })
}

/// `event_time` must be a JSON integer or a string composed entirely of
/// digits (coerced). Anything else, including null or a missing field, is
/// rejected before any storage is touched.
fn coerce_event_time(value: Option<&Value>) -> AppResult<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64().ok_or(AppError::InvalidEventTime),
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().map_err(|_| AppError::InvalidEventTime)
        }
        _ => Err(AppError::InvalidEventTime),
    }
}

/// Digit-only path segments are the only valid session keys; anything else
/// is treated as an unmatched route by the caller.
pub fn parse_session_key(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(body: &str) -> AppResult<Envelope> {
        parse_envelope(body.as_bytes())
    }

    #[test]
    fn accepts_integer_event_time() {
        let env = envelope(r#"{"transition":"idle_to_work","event_time":1000}"#).unwrap();
        assert_eq!(env.event_time, 1000);
        assert_eq!(env.kind, TransitionKind::IdleToWork);
        assert_eq!(env.transition, "idle_to_work");
    }

    #[test]
    fn coerces_digit_string_event_time() {
        let env = envelope(r#"{"event_time":"42"}"#).unwrap();
        assert_eq!(env.event_time, 42);
    }

    #[test]
    fn rejects_non_digit_event_time() {
        assert!(matches!(
            envelope(r#"{"event_time":"abc"}"#),
            Err(AppError::InvalidEventTime)
        ));
        assert!(matches!(
            envelope(r#"{"event_time":null}"#),
            Err(AppError::InvalidEventTime)
        ));
        assert!(matches!(
            envelope(r#"{"event_time":12.5}"#),
            Err(AppError::InvalidEventTime)
        ));
        assert!(matches!(
            envelope(r#"{"transition":"idle_to_work"}"#),
            Err(AppError::InvalidEventTime)
        ));
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(matches!(envelope("not json"), Err(AppError::MalformedBody)));
        assert!(matches!(envelope("[1,2,3]"), Err(AppError::MalformedBody)));
        assert!(matches!(envelope("\"str\""), Err(AppError::MalformedBody)));
    }

    #[test]
    fn missing_transition_is_unrecognized() {
        let env = envelope(r#"{"event_time":1}"#).unwrap();
        assert_eq!(env.kind, TransitionKind::Unrecognized);
        assert_eq!(env.transition, "");
    }

    #[test]
    fn unknown_transition_is_passed_through() {
        let env = envelope(r#"{"event_time":1,"transition":"lunch_to_nap"}"#).unwrap();
        assert_eq!(env.kind, TransitionKind::Unrecognized);
        assert_eq!(env.transition, "lunch_to_nap");
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let env = envelope(r#"{"event_time":1,"firmware":"2.1.0"}"#).unwrap();
        assert_eq!(env.payload.get("firmware"), Some(&json!("2.1.0")));
    }

    #[test]
    fn session_key_must_be_all_digits() {
        assert_eq!(parse_session_key("1000"), Some(1000));
        assert_eq!(parse_session_key(""), None);
        assert_eq!(parse_session_key("10a0"), None);
        assert_eq!(parse_session_key("-5"), None);
    }
}
