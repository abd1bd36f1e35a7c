use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::require_session;
use crate::ipc::types::{AppState, Request};
use crate::timetable::{CLASSES, TIME_SLOTS};

fn handle_time_slots(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_session(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "timeSlots": TIME_SLOTS }))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_session(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "classes": CLASSES }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.timeSlots" => Some(handle_time_slots(state, req)),
        "classes.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
