use serde_json::json;
use tracing::error;

use crate::clock::{Clock, SystemClock};
use crate::dashboard;
use crate::ipc::error::{ok, store_failed};
use crate::ipc::helpers::require_session;
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteStore;

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let now = SystemClock::new(state.config.utc_offset).now();
    match dashboard::summary(&SqliteStore::new(conn), now) {
        Ok(summary) => ok(&req.id, json!(summary)),
        Err(e) => {
            error!(error = %e, "dashboard counts failed");
            store_failed(&req.id)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
