use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub type RoomId = Ulid;
pub type CourseId = Ulid;
pub type UserId = Ulid;
pub type ScheduleId = Ulid;
pub type ReservationId = Ulid;

/// Half-open interval `[start, end)` of store-local wall-clock instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "Slot start must be before end");
        Self { start, end }
    }

    /// Combine a calendar date with a same-day time range.
    pub fn on(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(date.and_time(start), date.and_time(end))
    }

    /// The single overlap law: `[aStart,aEnd)` and `[bStart,bEnd)` overlap
    /// iff `aStart < bEnd && bStart < aEnd`. Touching at a boundary is not
    /// an overlap.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Half-open time-of-day window `[start, end)`. Recurring rules repeat
/// weekly, so they compare on time-of-day, never on absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(start < end, "DayWindow start must be before end");
        Self { start, end }
    }

    /// Same overlap law as [`Slot::overlaps`], applied to times of day.
    pub fn overlaps(&self, other: &DayWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Parity of a semester ordinal. Derived, never supplied independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemesterParity {
    Ganjil,
    Genap,
}

impl SemesterParity {
    pub fn from_ordinal(ordinal: u8) -> Self {
        if ordinal % 2 != 0 {
            SemesterParity::Ganjil
        } else {
            SemesterParity::Genap
        }
    }
}

impl std::fmt::Display for SemesterParity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemesterParity::Ganjil => write!(f, "ganjil"),
            SemesterParity::Genap => write!(f, "genap"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Approved => write!(f, "approved"),
            ReservationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// An admin decision on a pending reservation. Deliberately not
/// [`ReservationStatus`]: a transition back to pending is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn into_status(self) -> ReservationStatus {
        match self {
            Decision::Approved => ReservationStatus::Approved,
            Decision::Rejected => ReservationStatus::Rejected,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Aktif,
    Kosong,
    Pemeliharaan,
}

// ── Store rows ───────────────────────────────────────────────────

/// Owned by the room-management collaborator; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRow {
    pub id: RoomId,
    pub code: String,
    pub name: String,
    pub capacity: u32,
    pub status: RoomStatus,
    pub facilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub id: CourseId,
    pub code: String,
    pub name: String,
}

/// A recurring weekly class rule: occupies its room every matching weekday
/// within the active semester period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicScheduleRow {
    pub id: ScheduleId,
    pub room_id: RoomId,
    pub course_id: CourseId,
    pub lecturer_name: String,
    pub semester_ordinal: u8,
    pub parity: SemesterParity,
    /// 0=Sunday .. 6=Saturday.
    pub day_of_week: u8,
    pub window: DayWindow,
    pub created_at: DateTime<Utc>,
}

/// A one-off dated slot: placed directly by an admin, or materialized from an
/// approved reservation (semester 0, generated `RES-` course code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedScheduleRow {
    pub id: ScheduleId,
    pub room_id: RoomId,
    pub course_id: CourseId,
    pub lecturer_name: String,
    pub slot: Slot,
    pub semester: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRow {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub purpose: String,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_by_admin_id: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}

impl ReservationRow {
    /// The reservation's absolute slot, combined from its stored date and
    /// times-of-day.
    pub fn slot(&self) -> Slot {
        Slot::on(self.reservation_date, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
}

// ── Lifecycle events ─────────────────────────────────────────────

/// Broadcast per room through the notify hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ReservationRequested { id: ReservationId, slot: Slot },
    ReservationApproved { id: ReservationId, slot: Slot },
    ReservationRejected { id: ReservationId },
    AcademicRuleAdded { id: ScheduleId, day_of_week: u8, window: DayWindow },
    ScheduleAdded { id: ScheduleId, slot: Slot },
}

// ── Boundary requests ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub room_code: String,
    pub purpose: String,
    /// `YYYY-MM-DD`.
    pub reservation_date: String,
    /// `HH:MM`, normalized to seconds precision internally.
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcademicScheduleRequest {
    pub course_name: String,
    pub course_code: String,
    pub room_code: String,
    pub lecturer_name: String,
    pub semester_ordinal: u8,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideReservationRequest {
    pub decision: Decision,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

// ── Boundary records ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
}

impl UserInfo {
    /// Profile lookups are best-effort; absence degrades to placeholder
    /// display values.
    pub fn from_profile(id: UserId, profile: Option<ProfileRow>) -> Self {
        match profile {
            Some(p) => Self {
                id,
                full_name: p.full_name,
                username: p.username,
            },
            None => Self {
                id,
                full_name: "User".into(),
                username: "unknown_user".into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    pub id: ReservationId,
    pub room_code: String,
    pub room_name: String,
    pub requesting_user: UserInfo,
    pub purpose: String,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_by_admin: Option<UserInfo>,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicScheduleRecord {
    pub id: ScheduleId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub room_id: RoomId,
    pub room_code: String,
    pub room_name: String,
    pub lecturer_name: String,
    pub semester_ordinal: u8,
    pub parity: SemesterParity,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedScheduleRecord {
    pub id: ScheduleId,
    pub course_name: Option<String>,
    pub room_code: Option<String>,
    pub room_name: Option<String>,
    pub lecturer_name: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub semester: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn slot_overlap() {
        let a = Slot::on(d("2025-06-10"), t("09:00:00"), t("10:00:00"));
        let b = Slot::on(d("2025-06-10"), t("09:30:00"), t("10:30:00"));
        let c = Slot::on(d("2025-06-10"), t("10:00:00"), t("11:00:00"));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // back-to-back, half-open
    }

    #[test]
    fn slot_different_dates_never_overlap() {
        let a = Slot::on(d("2025-06-10"), t("09:00:00"), t("10:00:00"));
        let b = Slot::on(d("2025-06-11"), t("09:00:00"), t("10:00:00"));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn day_window_overlap() {
        let a = DayWindow::new(t("08:00:00"), t("09:30:00"));
        let b = DayWindow::new(t("09:00:00"), t("10:00:00"));
        let c = DayWindow::new(t("09:30:00"), t("11:00:00"));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent
    }

    #[test]
    fn parity_from_ordinal() {
        assert_eq!(SemesterParity::from_ordinal(1), SemesterParity::Ganjil);
        assert_eq!(SemesterParity::from_ordinal(3), SemesterParity::Ganjil);
        assert_eq!(SemesterParity::from_ordinal(2), SemesterParity::Genap);
        assert_eq!(SemesterParity::from_ordinal(14), SemesterParity::Genap);
    }

    #[test]
    fn reservation_slot_combines_date_and_times() {
        let row = ReservationRow {
            id: Ulid::new(),
            room_id: Ulid::new(),
            user_id: Ulid::new(),
            purpose: "Rapat".into(),
            reservation_date: d("2025-06-10"),
            start_time: t("09:00:00"),
            end_time: t("10:00:00"),
            status: ReservationStatus::Pending,
            requested_at: Utc::now(),
            processed_by_admin_id: None,
            processed_at: None,
            admin_notes: None,
        };
        let slot = row.slot();
        assert_eq!(slot.start.to_string(), "2025-06-10 09:00:00");
        assert_eq!(slot.end.to_string(), "2025-06-10 10:00:00");
    }

    #[test]
    fn request_parses_camel_case() {
        let req: CreateReservationRequest = serde_json::from_str(
            r#"{"roomCode":"R101","purpose":"Seminar","reservationDate":"2025-06-10","startTime":"09:00","endTime":"10:00"}"#,
        )
        .unwrap();
        assert_eq!(req.room_code, "R101");
        assert_eq!(req.start_time, "09:00");
    }

    #[test]
    fn decision_parses_lowercase_and_rejects_pending() {
        let req: DecideReservationRequest =
            serde_json::from_str(r#"{"decision":"approved"}"#).unwrap();
        assert_eq!(req.decision, Decision::Approved);
        assert_eq!(req.admin_notes, None);

        let bad = serde_json::from_str::<DecideReservationRequest>(r#"{"decision":"pending"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn user_info_fallback() {
        let id = Ulid::new();
        let info = UserInfo::from_profile(id, None);
        assert_eq!(info.full_name, "User");
        assert_eq!(info.username, "unknown_user");
    }
}
