use chrono::{DateTime, Days, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Membership-expiry windows offered by the roster filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpiryWindow {
    #[default]
    All,
    Within1Day,
    Within3Days,
    Within7Days,
    Within1Month,
}

impl ExpiryWindow {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "within1Day" => Some(Self::Within1Day),
            "within3Days" => Some(Self::Within3Days),
            "within7Days" => Some(Self::Within7Days),
            "within1Month" => Some(Self::Within1Month),
            _ => None,
        }
    }

    pub fn days(self) -> Option<u64> {
        match self {
            Self::All => None,
            Self::Within1Day => Some(1),
            Self::Within3Days => Some(3),
            Self::Within7Days => Some(7),
            Self::Within1Month => Some(30),
        }
    }

    /// Half-open range `[start of today, start of the day after today + N)`,
    /// which is the same as ending at the last instant of day `today + N`.
    /// `None` for `All`.
    pub fn bounds(self, now: DateTime<FixedOffset>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let days = self.days()?;
        let today = now.date_naive();
        let upper_day = today.checked_add_days(Days::new(days + 1))?;
        let offset = now.timezone();
        let lower = offset
            .from_local_datetime(&today.and_hms_opt(0, 0, 0)?)
            .single()?;
        let upper = offset
            .from_local_datetime(&upper_day.and_hms_opt(0, 0, 0)?)
            .single()?;
        Some((lower.to_utc(), upper.to_utc()))
    }

    /// Records without an end date only survive `All`.
    pub fn includes(self, membership_end: Option<DateTime<Utc>>, now: DateTime<FixedOffset>) -> bool {
        let Some((lower, upper)) = self.bounds(now) else {
            return self == Self::All;
        };
        match membership_end {
            Some(end) => end >= lower && end < upper,
            None => false,
        }
    }
}
