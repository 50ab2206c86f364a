use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-bounded gate pass for one vehicle.
///
/// `valid_until` is kept as the raw wire string so a single malformed or
/// null row never fails the whole vehicle payload. Use [`valid_until_at`]
/// to read it.
///
/// [`valid_until_at`]: VehicleRegistration::valid_until_at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRegistration {
    pub id: i64,
    pub vehicle_id: i64,
    pub code: String,
    #[serde(default)]
    pub valid_until: Option<String>,
}

impl VehicleRegistration {
    /// Parses `valid_until`, returning `None` when the value is unusable.
    pub fn valid_until_at(&self) -> Option<DateTime<Utc>> {
        self.valid_until.as_deref().and_then(parse_timestamp)
    }

    /// Inclusive: a registration is still valid at exactly `valid_until`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until_at().is_some_and(|until| until >= now)
    }
}

/// Accepts RFC 3339, naive date-times (read as UTC) and bare dates
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
