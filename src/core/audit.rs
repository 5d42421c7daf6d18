//! Per-event audit artifact: one pretty-printed JSON file per accepted
//! transition, addressable by `{session_key}-{event_time}.json`.
//!
//! serde_json's default map keeps keys in a BTreeMap, so serialization is
//! deterministic with sorted keys at every nesting level. Retries of the
//! same event overwrite the same file, which is fine for an audit dump.

use crate::errors::AppResult;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_received(
    dir: &Path,
    session_key: i64,
    event_time: i64,
    payload: &Map<String, Value>,
) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}-{}.json", session_key, event_time));
    let pretty = serde_json::to_string_pretty(&Value::Object(payload.clone()))?;
    fs::write(&path, pretty)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_sorted_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let Value::Object(payload) = json!({
            "transition": "idle_to_work",
            "event_time": 1000,
            "work_flavor": "deep"
        }) else {
            unreachable!()
        };

        let path = write_received(dir.path(), 1000, 1000, &payload).unwrap();
        assert_eq!(path.file_name().unwrap(), "1000-1000.json");

        let written = std::fs::read_to_string(&path).unwrap();
        let expected = "{\n  \"event_time\": 1000,\n  \"transition\": \"idle_to_work\",\n  \"work_flavor\": \"deep\"\n}";
        assert_eq!(written, expected);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("received");
        let payload = Map::new();

        write_received(&nested, 1, 2, &payload).unwrap();
        assert!(nested.join("1-2.json").exists());
    }
}
