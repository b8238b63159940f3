use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// A date or time string that could not be parsed into an instant.
///
/// Returned instead of a sentinel value so an unparsed input can never reach
/// an overlap comparison unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimeValue(pub String);

impl std::fmt::Display for InvalidTimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date/time value: '{}'", self.0)
    }
}

impl std::error::Error for InvalidTimeValue {}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Accepts `HH:MM` at the boundary and `HH:MM:SS` as stored, normalizing both
/// to seconds precision.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Combine a calendar date and a wall-clock time into a single instant.
pub fn combine(date: &str, time: &str) -> Result<NaiveDateTime, InvalidTimeValue> {
    match (parse_date(date), parse_time(time)) {
        (Some(d), Some(t)) => Ok(d.and_time(t)),
        _ => Err(InvalidTimeValue(format!("{date}T{time}"))),
    }
}

/// Current UTC time truncated to minute precision — booking start times are
/// compared at minute granularity, so seconds must not tip a reservation
/// placed "now" into the past.
pub fn now_to_minute() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_second(0)
        .and_then(|n| n.with_nanosecond(0))
        .unwrap_or(now)
}
