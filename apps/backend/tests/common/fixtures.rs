//! Request bodies for repeat-session tests.

use serde_json::{json, Value};

/// Body for POST /api/languages/:language_id/repeat.
pub fn start_request(category_ids: &[i64], requested_count: i64, method: &str) -> Value {
    json!({
        "category_ids": category_ids,
        "requested_count": requested_count,
        "method": method,
    })
}

/// Body for an answer to the single answer part at position 1.
pub fn answer_request(answer: &str, method: Option<&str>) -> Value {
    json!({
        "answers": { "1": answer },
        "method": method,
    })
}

/// Repeat-session base path for a language.
pub fn repeat_path(language_id: i64) -> String {
    format!("/api/languages/{}/repeat", language_id)
}
