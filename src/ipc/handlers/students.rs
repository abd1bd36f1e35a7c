use std::rc::Rc;

use rusqlite::Connection;
use serde_json::json;

use crate::clock::SystemClock;
use crate::expiry::ExpiryWindow;
use crate::ipc::error::{bad_params, err, ok, store_failed, validation_failed};
use crate::ipc::helpers::{require_session, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::{Coaching, MembershipPlan, StudentStatus};
use crate::roster::{RosterController, RosterError, SaveMode};
use crate::store::SqliteStore;
use crate::validate::StudentDraft;

fn build_roster(state: &AppState, conn: Rc<Connection>) -> RosterController<SqliteStore> {
    let mut roster = RosterController::new(
        SqliteStore::new(conn),
        Box::new(SystemClock::new(state.config.utc_offset)),
        state.config.page_size,
    );
    let slot = state.pending_event.clone();
    roster.subscribe(move |snapshot| {
        *slot.borrow_mut() = Some(json!({
            "event": "students.changed",
            "payload": snapshot,
        }));
    });
    roster
}

/// The roster view for the signed-in session, opened on first use.
fn roster_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut RosterController<SqliteStore>, serde_json::Value> {
    let conn = require_session(state, req)?;
    if state.roster.is_none() {
        let mut roster = build_roster(state, conn);
        roster.open();
        state.roster = Some(roster);
    }
    state
        .roster
        .as_mut()
        .ok_or_else(|| store_failed(&req.id))
}

fn snapshot_json(roster: &RosterController<SqliteStore>) -> serde_json::Value {
    json!(roster.snapshot())
}

fn roster_err(req: &Request, e: RosterError) -> serde_json::Value {
    match &e {
        RosterError::Validation(v) => validation_failed(&req.id, *v),
        RosterError::Store(_) => store_failed(&req.id),
        RosterError::NoPendingDelete => {
            err(&req.id, "no_pending_delete", e.user_message(), None)
        }
    }
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_session(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let mut roster = match state.roster.take() {
        Some(r) => r,
        None => build_roster(state, conn),
    };
    let migration = roster.open();
    let result = json!({
        "roster": snapshot_json(&roster),
        "migration": migration,
    });
    state.roster = Some(roster);
    ok(&req.id, result)
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    match roster_mut(state, req) {
        Ok(roster) => ok(&req.id, json!({ "roster": snapshot_json(roster) })),
        Err(resp) => resp,
    }
}

#[derive(Clone, Copy)]
enum Move {
    Next,
    Previous,
    First,
}

fn handle_move(state: &mut AppState, req: &Request, direction: Move) -> serde_json::Value {
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = match direction {
        Move::Next => roster.next_page(),
        Move::Previous => roster.previous_page(),
        Move::First => roster.reset_to_first_page(),
    };
    match result {
        Ok(moved) => ok(
            &req.id,
            json!({ "moved": moved, "roster": snapshot_json(roster) }),
        ),
        Err(_) => store_failed(&req.id),
    }
}

fn handle_set_expiry_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match str_param(req, "window") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(window) = ExpiryWindow::parse(raw) else {
        return bad_params(&req.id, format!("unknown expiry window: {raw}"));
    };
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    roster.set_expiry_filter(window);
    ok(&req.id, json!({ "roster": snapshot_json(roster) }))
}

fn handle_refresh_count(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match roster.refresh_count() {
        Ok(n) => ok(
            &req.id,
            json!({ "totalCount": n, "roster": snapshot_json(roster) }),
        ),
        Err(_) => store_failed(&req.id),
    }
}

/// Integral floats such as `12.0` read as whole numbers; anything else keeps
/// its JSON spelling and is judged by validation.
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Reads the form payload. Field content problems are left to validation;
/// only values outside the fixed choice lists are rejected here.
fn parse_draft(req: &Request) -> Result<StudentDraft, serde_json::Value> {
    let Some(student) = req.params.get("student").and_then(|v| v.as_object()) else {
        return Err(bad_params(&req.id, "missing student"));
    };
    let text = |key: &str| {
        student
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    let age = match student.get("age") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => number_text(n),
        _ => String::new(),
    };

    let mut draft = StudentDraft {
        name: text("name"),
        age,
        email: text("email"),
        ..StudentDraft::default()
    };
    if let Some(raw) = student.get("coaching").and_then(|v| v.as_str()) {
        draft.coaching = Coaching::parse(raw).ok_or_else(|| {
            bad_params(&req.id, format!("unknown coaching: {raw}"))
        })?;
    }
    if let Some(raw) = student.get("status").and_then(|v| v.as_str()) {
        draft.status = StudentStatus::parse(raw)
            .ok_or_else(|| bad_params(&req.id, format!("unknown status: {raw}")))?;
    }
    if let Some(raw) = student.get("plan").and_then(|v| v.as_str()) {
        draft.plan = MembershipPlan::from_label(raw);
    }
    Ok(draft)
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mode = match req.params.get("mode").and_then(|v| v.as_str()) {
        Some("add") => SaveMode::Add,
        Some("edit") => match str_param(req, "studentId") {
            Ok(id) => SaveMode::Edit(id.to_string()),
            Err(resp) => return resp,
        },
        _ => return bad_params(&req.id, "mode must be add or edit"),
    };
    let draft = match parse_draft(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match roster.save_student(mode, &draft) {
        Ok(student_id) => ok(
            &req.id,
            json!({ "studentId": student_id, "roster": snapshot_json(roster) }),
        ),
        Err(e) => roster_err(req, e),
    }
}

fn handle_delete_request(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match str_param(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let pending = roster.request_delete(student_id);
    ok(
        &req.id,
        json!({ "pendingDelete": pending, "roster": snapshot_json(roster) }),
    )
}

fn handle_delete_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    roster.cancel_delete();
    ok(&req.id, json!({ "roster": snapshot_json(roster) }))
}

fn handle_delete_confirm(state: &mut AppState, req: &Request) -> serde_json::Value {
    let roster = match roster_mut(state, req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match roster.confirm_delete() {
        Ok(()) => ok(&req.id, json!({ "roster": snapshot_json(roster) })),
        Err(e) => roster_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.open" => Some(handle_open(state, req)),
        "students.state" => Some(handle_state(state, req)),
        "students.nextPage" => Some(handle_move(state, req, Move::Next)),
        "students.previousPage" => Some(handle_move(state, req, Move::Previous)),
        "students.firstPage" => Some(handle_move(state, req, Move::First)),
        "students.setExpiryFilter" => Some(handle_set_expiry_filter(state, req)),
        "students.refreshCount" => Some(handle_refresh_count(state, req)),
        "students.save" => Some(handle_save(state, req)),
        "students.delete.request" => Some(handle_delete_request(state, req)),
        "students.delete.cancel" => Some(handle_delete_cancel(state, req)),
        "students.delete.confirm" => Some(handle_delete_confirm(state, req)),
        _ => None,
    }
}
