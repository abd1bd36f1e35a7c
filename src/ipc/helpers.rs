use std::rc::Rc;

use rusqlite::Connection;

use crate::ipc::error::{bad_params, err, no_workspace};
use crate::ipc::types::{AppState, Request};

/// Connection for a method that needs an open workspace and a signed-in
/// staff member. The error value is a ready-to-send response.
pub fn require_session(
    state: &AppState,
    req: &Request,
) -> Result<Rc<Connection>, serde_json::Value> {
    let Some(conn) = state.db.clone() else {
        return Err(no_workspace(&req.id));
    };
    if state.session.is_none() {
        return Err(err(&req.id, "unauthenticated", "sign in first", None));
    }
    Ok(conn)
}

pub fn str_param<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| bad_params(&req.id, format!("missing {key}")))
}
