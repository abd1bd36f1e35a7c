mod test_support;

use serde_json::json;
use test_support::{
    add_student, request_err, request_ok, request_with_events, roster_ids, sign_in_fresh,
    spawn_sidecar, temp_dir,
};

#[test]
fn delete_needs_confirmation_and_refreshes_the_view() {
    let workspace = temp_dir("rosterd-delete");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    sign_in_fresh(&mut stdin, &mut reader, &workspace);

    let keep = add_student(&mut stdin, &mut reader, "a1", "Keeper");
    let doomed = add_student(&mut stdin, &mut reader, "a2", "Leaver");

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "early",
        "students.delete.confirm",
        json!({}),
        "no_pending_delete",
    );

    let asked = request_ok(
        &mut stdin,
        &mut reader,
        "ask",
        "students.delete.request",
        json!({ "studentId": doomed }),
    );
    assert_eq!(
        asked.get("pendingDelete"),
        Some(&json!({ "studentId": doomed, "studentName": "Leaver" }))
    );
    assert_eq!(
        asked
            .get("roster")
            .and_then(|r| r.get("pendingDelete"))
            .and_then(|p| p.get("studentId"))
            .and_then(|v| v.as_str()),
        Some(doomed.as_str())
    );

    // Cancelling leaves the roster untouched.
    let cancelled = request_ok(&mut stdin, &mut reader, "cancel", "students.delete.cancel", json!({}));
    let roster = cancelled.get("roster").cloned().expect("roster");
    assert!(roster.get("pendingDelete").expect("pendingDelete").is_null());
    assert_eq!(roster.get("totalCount").and_then(|v| v.as_u64()), Some(2));
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "after-cancel",
        "students.delete.confirm",
        json!({}),
        "no_pending_delete",
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "ask2",
        "students.delete.request",
        json!({ "studentId": doomed }),
    );
    let (events, resp) =
        request_with_events(&mut stdin, &mut reader, "confirm", "students.delete.confirm", json!({}));
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true), "{resp}");
    assert_eq!(events.len(), 1);
    let roster = resp
        .get("result")
        .and_then(|r| r.get("roster"))
        .cloned()
        .expect("roster");
    assert_eq!(events[0].get("payload"), Some(&roster));
    assert_eq!(roster.get("totalCount").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(roster.get("pageNumber").and_then(|v| v.as_u64()), Some(1));
    assert!(roster.get("pendingDelete").expect("pendingDelete").is_null());
    assert_eq!(roster_ids(&roster), vec![keep.clone()]);

    // Deleting an id that is already gone still succeeds.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "ask3",
        "students.delete.request",
        json!({ "studentId": doomed }),
    );
    let again = request_ok(&mut stdin, &mut reader, "confirm2", "students.delete.confirm", json!({}));
    assert_eq!(
        again
            .get("roster")
            .and_then(|r| r.get("totalCount"))
            .and_then(|v| v.as_u64()),
        Some(1)
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "missing-id",
        "students.delete.request",
        json!({}),
        "bad_params",
    );

    drop(stdin);
    let _ = child.wait();
}
