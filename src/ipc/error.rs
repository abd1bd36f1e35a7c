use serde_json::json;

use crate::roster::GENERIC_FAILURE;
use crate::validate::ValidationError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({ "code": code, "message": message.into() });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({ "id": id, "ok": false, "error": error })
}

pub fn bad_params(id: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, "bad_params", message, None)
}

/// Store detail stays in the log; callers only see the generic text.
pub fn store_failed(id: &str) -> serde_json::Value {
    err(id, "store_failed", GENERIC_FAILURE, None)
}

pub fn validation_failed(id: &str, e: ValidationError) -> serde_json::Value {
    err(
        id,
        "validation_failed",
        e.to_string(),
        Some(json!({ "field": e.field() })),
    )
}

pub fn no_workspace(id: &str) -> serde_json::Value {
    err(id, "no_workspace", "select a workspace first", None)
}
