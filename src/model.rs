use chrono::{DateTime, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coaching {
    Coach,
    #[serde(rename = "Self")]
    SelfGuided,
}

impl Coaching {
    pub fn label(self) -> &'static str {
        match self {
            Self::Coach => "Coach",
            Self::SelfGuided => "Self",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Coach" => Some(Self::Coach),
            "Self" => Some(Self::SelfGuided),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Membership tier. Each tier maps to a calendar interval added to the
/// membership start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MembershipPlan {
    #[default]
    Monthly,
    Quarterly,
    #[serde(rename = "Half-Yearly")]
    HalfYearly,
    Annual,
}

impl MembershipPlan {
    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::HalfYearly => "Half-Yearly",
            Self::Annual => "Annual",
        }
    }

    /// Unknown or missing labels fall back to `Monthly`.
    pub fn from_label(s: &str) -> Self {
        match s.trim() {
            "Quarterly" => Self::Quarterly,
            "Half-Yearly" => Self::HalfYearly,
            "Annual" => Self::Annual,
            _ => Self::Monthly,
        }
    }

    pub fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Annual => 12,
        }
    }

    /// Calendar month arithmetic; the day clamps to the end of shorter months
    /// (Jan 31 + 1 month lands on the last day of February).
    pub fn membership_end<Tz: TimeZone>(self, start: &DateTime<Tz>) -> DateTime<Tz> {
        start
            .clone()
            .checked_add_months(Months::new(self.months()))
            .unwrap_or_else(|| start.clone())
    }
}

/// A roster document as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub age: Option<i64>,
    pub email: String,
    pub coaching: Coaching,
    pub status: StudentStatus,
    pub plan: MembershipPlan,
    pub membership_start: Option<DateTime<Utc>>,
    pub membership_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The mutable fields written by both add and edit. Edits overwrite every
/// one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub coaching: Coaching,
    pub status: StudentStatus,
    pub plan: MembershipPlan,
    pub membership_start: DateTime<Utc>,
    pub membership_end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid date")
            .and_utc()
    }

    #[test]
    fn plan_durations_add_calendar_months() {
        let start = utc(2024, 1, 15);
        assert_eq!(MembershipPlan::Monthly.membership_end(&start), utc(2024, 2, 15));
        assert_eq!(MembershipPlan::Quarterly.membership_end(&start), utc(2024, 4, 15));
        assert_eq!(MembershipPlan::HalfYearly.membership_end(&start), utc(2024, 7, 15));
        assert_eq!(MembershipPlan::Annual.membership_end(&start), utc(2025, 1, 15));
    }

    #[test]
    fn month_end_clamps_to_shorter_month() {
        assert_eq!(
            MembershipPlan::Monthly.membership_end(&utc(2024, 1, 31)),
            utc(2024, 2, 29)
        );
        assert_eq!(
            MembershipPlan::Monthly.membership_end(&utc(2023, 1, 31)),
            utc(2023, 2, 28)
        );
    }

    #[test]
    fn month_arithmetic_uses_the_start_offset() {
        // Mar 31 03:00 at +05:30 is Mar 30 in UTC. Adding a month in UTC would
        // land on May 1 locally; the local calendar clamps to Apr 30.
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).expect("offset");
        let start = offset
            .with_ymd_and_hms(2024, 3, 31, 3, 0, 0)
            .single()
            .expect("start");
        let end = MembershipPlan::Monthly.membership_end(&start);
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 4, 30).expect("date"));
    }

    #[test]
    fn unknown_plan_label_defaults_to_monthly() {
        assert_eq!(MembershipPlan::from_label("Weekly"), MembershipPlan::Monthly);
        assert_eq!(MembershipPlan::from_label(""), MembershipPlan::Monthly);
        assert_eq!(MembershipPlan::from_label("Half-Yearly"), MembershipPlan::HalfYearly);
        assert_eq!(MembershipPlan::from_label(" Annual "), MembershipPlan::Annual);
    }

    #[test]
    fn coaching_serializes_with_display_labels() {
        assert_eq!(
            serde_json::to_value(Coaching::SelfGuided).expect("json"),
            serde_json::json!("Self")
        );
        assert_eq!(
            serde_json::to_value(MembershipPlan::HalfYearly).expect("json"),
            serde_json::json!("Half-Yearly")
        );
        assert_eq!(Coaching::parse("Self"), Some(Coaching::SelfGuided));
        assert_eq!(StudentStatus::parse("Retired"), None);
    }
}
