use crate::store::{DocumentStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub scanned: usize,
    pub patched: usize,
    pub failed: usize,
}

/// Gives every record lacking a creation time the time `now`, so that it
/// takes part in creation-time paging. Each patch re-checks presence, so
/// running this again skips records that were already fixed.
pub fn backfill_created_at<S: DocumentStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<MigrationReport, StoreError> {
    let ids = store.scan_missing_created_at()?;
    let mut report = MigrationReport {
        scanned: ids.len(),
        ..MigrationReport::default()
    };
    if ids.is_empty() {
        return Ok(report);
    }

    // Patches are independent; one failure must not hold back the others.
    for id in &ids {
        match store.set_created_at_if_missing(id, now) {
            Ok(true) => report.patched += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(student_id = %id, error = %e, "failed to backfill created_at");
                report.failed += 1;
            }
        }
    }

    info!(
        scanned = report.scanned,
        patched = report.patched,
        failed = report.failed,
        "backfilled missing student creation times"
    );
    Ok(report)
}
