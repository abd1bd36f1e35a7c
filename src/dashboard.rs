use crate::expiry::ExpiryWindow;
use crate::model::{Coaching, StudentStatus};
use crate::store::{CountFilter, CountService, StoreError};
use crate::timetable::{self, TIME_SLOTS};
use chrono::{DateTime, Datelike, FixedOffset};
use serde::Serialize;

/// Landing-page figures. Unlike the roster filter, the expiring count covers
/// the whole collection. Class figures come from the fixed catalogue;
/// `sessions_today` uses the academy's weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: u64,
    pub active_students: u64,
    pub inactive_students: u64,
    pub coached_students: u64,
    pub self_students: u64,
    pub expiring_within7_days: u64,
    pub time_slots: usize,
    pub active_classes: usize,
    pub instructors: usize,
    pub sessions_today: usize,
}

pub fn summary<C: CountService>(counts: &C, now: DateTime<FixedOffset>) -> Result<DashboardSummary, StoreError> {
    let by_status = |status| CountFilter {
        status: Some(status),
        ..CountFilter::default()
    };
    let by_coaching = |coaching| CountFilter {
        coaching: Some(coaching),
        ..CountFilter::default()
    };
    let expiring = CountFilter {
        membership_end_between: ExpiryWindow::Within7Days.bounds(now),
        ..CountFilter::default()
    };

    Ok(DashboardSummary {
        total_students: counts.count(&CountFilter::all())?,
        active_students: counts.count(&by_status(StudentStatus::Active))?,
        inactive_students: counts.count(&by_status(StudentStatus::Inactive))?,
        coached_students: counts.count(&by_coaching(Coaching::Coach))?,
        self_students: counts.count(&by_coaching(Coaching::SelfGuided))?,
        expiring_within7_days: counts.count(&expiring)?,
        time_slots: TIME_SLOTS.len(),
        active_classes: timetable::active_class_count(),
        instructors: timetable::instructor_count(),
        sessions_today: timetable::sessions_on(now.weekday()),
    })
}
