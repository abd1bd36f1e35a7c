use serde_json::json;
use tracing::error;

use crate::auth::{AuthError, Authenticator, SqliteAuthenticator};
use crate::ipc::error::{err, no_workspace, ok, store_failed};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};

fn auth_err(req: &Request, e: AuthError) -> serde_json::Value {
    match e {
        AuthError::Database(ref db_err) => {
            error!(error = %db_err, method = %req.method, "account lookup failed");
            store_failed(&req.id)
        }
        other => err(&req.id, "auth_failed", other.to_string(), None),
    }
}

fn authenticator(state: &AppState, req: &Request) -> Result<SqliteAuthenticator, serde_json::Value> {
    match state.db.clone() {
        Some(conn) => Ok(SqliteAuthenticator::new(conn)),
        None => Err(no_workspace(&req.id)),
    }
}

/// Creates a staff account. Without a session this only works while the
/// workspace has no accounts at all.
fn handle_bootstrap(state: &mut AppState, req: &Request) -> serde_json::Value {
    let auth = match authenticator(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let email = match str_param(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let password = match str_param(req, "password") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let display_name = req.params.get("displayName").and_then(|v| v.as_str());

    if state.session.is_none() {
        match auth.account_count() {
            Ok(0) => {}
            Ok(_) => {
                return err(
                    &req.id,
                    "unauthenticated",
                    "accounts already exist; sign in to add staff",
                    None,
                )
            }
            Err(e) => return auth_err(req, e),
        }
    }

    match auth.create_account(email, password, display_name) {
        Ok(account_id) => ok(&req.id, json!({ "accountId": account_id })),
        Err(e) => auth_err(req, e),
    }
}

fn handle_sign_in(state: &mut AppState, req: &Request) -> serde_json::Value {
    let auth = match authenticator(state, req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let email = req.params.get("email").and_then(|v| v.as_str()).unwrap_or("");
    let password = req
        .params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match auth.sign_in(email, password) {
        Ok(session) => {
            state.roster = None;
            let result = json!({ "session": session });
            state.session = Some(session);
            ok(&req.id, result)
        }
        Err(e) => auth_err(req, e),
    }
}

fn handle_sign_out(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session = None;
    state.roster = None;
    ok(&req.id, json!({ "ok": true }))
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "signedIn": state.session.is_some(),
            "session": state.session,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.bootstrap" => Some(handle_bootstrap(state, req)),
        "auth.signIn" => Some(handle_sign_in(state, req)),
        "auth.signOut" => Some(handle_sign_out(state, req)),
        "auth.state" => Some(handle_state(state, req)),
        _ => None,
    }
}
