use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ulid::Ulid;

use crate::model::*;

#[derive(Debug)]
pub enum StoreError {
    /// The backing store could not be reached or returned an unexpected shape.
    Unavailable(String),
    /// An insert lost to a uniqueness constraint.
    UniqueViolation(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
            StoreError::UniqueViolation(what) => write!(f, "unique violation: {what}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Store-access capability injected into the engine at construction.
///
/// Primitives are deliberately simple: coarse lookups on indexed columns and
/// constraint-fenced inserts. Precise interval filtering stays in the engine,
/// so a backend never has to express the half-open overlap law against
/// composite date + time-of-day columns.
#[async_trait]
pub trait Store: Send + Sync {
    async fn room_by_code(&self, code: &str) -> Result<Option<RoomRow>, StoreError>;
    async fn room_by_id(&self, id: RoomId) -> Result<Option<RoomRow>, StoreError>;

    /// Atomic "insert if absent, else return existing", keyed by course code.
    /// Never a separate read-then-write: concurrent creations of the same new
    /// code must converge on one row.
    async fn course_by_code_or_insert(
        &self,
        code: &str,
        name: &str,
    ) -> Result<CourseRow, StoreError>;
    async fn course_by_id(&self, id: CourseId) -> Result<Option<CourseRow>, StoreError>;

    /// Insert fails with [`StoreError::UniqueViolation`] when an exact
    /// duplicate of (room, day-of-week, ordinal, start, end) already exists.
    async fn insert_academic_rule(&self, row: AcademicScheduleRow) -> Result<(), StoreError>;
    /// Coarse lookup by the indexed (room, day-of-week, semester-ordinal) key.
    async fn academic_rules_for(
        &self,
        room_id: RoomId,
        day_of_week: u8,
        semester_ordinal: u8,
    ) -> Result<Vec<AcademicScheduleRow>, StoreError>;

    async fn insert_dated_schedule(&self, row: DatedScheduleRow) -> Result<(), StoreError>;
    /// Dated schedules of the room whose absolute slot overlaps `slot` —
    /// resolvable against plain indexed timestamp columns.
    async fn dated_schedules_overlapping(
        &self,
        room_id: RoomId,
        slot: Slot,
    ) -> Result<Vec<DatedScheduleRow>, StoreError>;
    /// All dated schedules, ordered by start ascending.
    async fn list_dated_schedules(&self) -> Result<Vec<DatedScheduleRow>, StoreError>;

    async fn insert_reservation(&self, row: ReservationRow) -> Result<(), StoreError>;
    async fn reservation(&self, id: ReservationId) -> Result<Option<ReservationRow>, StoreError>;
    /// Approved reservations of the room dated on any of `dates`. Coarse by
    /// design; the engine applies the precise overlap filter.
    async fn approved_reservations_on(
        &self,
        room_id: RoomId,
        dates: &[NaiveDate],
    ) -> Result<Vec<ReservationRow>, StoreError>;
    /// Persist a decision; returns the updated row, or `None` if the
    /// reservation vanished.
    async fn update_reservation_decision(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        admin_id: UserId,
        processed_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Option<ReservationRow>, StoreError>;
    /// A user's reservations, newest request first.
    async fn reservations_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReservationRow>, StoreError>;
    /// Every reservation, newest request first.
    async fn all_reservations(&self) -> Result<Vec<ReservationRow>, StoreError>;

    async fn profile_by_id(&self, id: UserId) -> Result<Option<ProfileRow>, StoreError>;
}

type RuleKey = (RoomId, u8, u8);
type RuleExactKey = (RoomId, u8, u8, NaiveTime, NaiveTime);

/// DashMap-backed [`Store`] for tests and embedders without a database.
pub struct InMemoryStore {
    rooms: DashMap<RoomId, RoomRow>,
    room_codes: DashMap<String, RoomId>,
    /// Courses keyed by their unique code; the entry API is the upsert.
    courses: DashMap<String, CourseRow>,
    academic: DashMap<RuleKey, Vec<AcademicScheduleRow>>,
    /// Uniqueness constraint on the exact rule tuple.
    academic_exact: DashMap<RuleExactKey, ScheduleId>,
    dated: DashMap<RoomId, Vec<DatedScheduleRow>>,
    reservations: DashMap<ReservationId, ReservationRow>,
    profiles: DashMap<UserId, ProfileRow>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            room_codes: DashMap::new(),
            courses: DashMap::new(),
            academic: DashMap::new(),
            academic_exact: DashMap::new(),
            dated: DashMap::new(),
            reservations: DashMap::new(),
            profiles: DashMap::new(),
        }
    }

    // Rooms and profiles are owned by collaborators; seeding stands in for
    // their write paths.

    pub fn seed_room(&self, code: &str, name: &str, capacity: u32) -> RoomRow {
        let row = RoomRow {
            id: Ulid::new(),
            code: code.to_owned(),
            name: name.to_owned(),
            capacity,
            status: RoomStatus::Aktif,
            facilities: Vec::new(),
        };
        self.room_codes.insert(row.code.clone(), row.id);
        self.rooms.insert(row.id, row.clone());
        row
    }

    pub fn seed_profile(&self, full_name: &str, username: &str) -> ProfileRow {
        let row = ProfileRow {
            id: Ulid::new(),
            full_name: full_name.to_owned(),
            username: username.to_owned(),
        };
        self.profiles.insert(row.id, row.clone());
        row
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn room_by_code(&self, code: &str) -> Result<Option<RoomRow>, StoreError> {
        let id = match self.room_codes.get(code) {
            Some(e) => *e.value(),
            None => return Ok(None),
        };
        Ok(self.rooms.get(&id).map(|e| e.value().clone()))
    }

    async fn room_by_id(&self, id: RoomId) -> Result<Option<RoomRow>, StoreError> {
        Ok(self.rooms.get(&id).map(|e| e.value().clone()))
    }

    async fn course_by_code_or_insert(
        &self,
        code: &str,
        name: &str,
    ) -> Result<CourseRow, StoreError> {
        let row = self
            .courses
            .entry(code.to_owned())
            .or_insert_with(|| CourseRow {
                id: Ulid::new(),
                code: code.to_owned(),
                name: name.to_owned(),
            })
            .clone();
        Ok(row)
    }

    async fn course_by_id(&self, id: CourseId) -> Result<Option<CourseRow>, StoreError> {
        Ok(self
            .courses
            .iter()
            .find(|e| e.value().id == id)
            .map(|e| e.value().clone()))
    }

    async fn insert_academic_rule(&self, row: AcademicScheduleRow) -> Result<(), StoreError> {
        let exact = (
            row.room_id,
            row.day_of_week,
            row.semester_ordinal,
            row.window.start,
            row.window.end,
        );
        match self.academic_exact.entry(exact) {
            Entry::Occupied(_) => {
                return Err(StoreError::UniqueViolation(
                    "academic_schedules(room_id, day_of_week, semester_ordinal, start_time, end_time)",
                ));
            }
            Entry::Vacant(v) => {
                v.insert(row.id);
            }
        }
        self.academic
            .entry((row.room_id, row.day_of_week, row.semester_ordinal))
            .or_default()
            .push(row);
        Ok(())
    }

    async fn academic_rules_for(
        &self,
        room_id: RoomId,
        day_of_week: u8,
        semester_ordinal: u8,
    ) -> Result<Vec<AcademicScheduleRow>, StoreError> {
        Ok(self
            .academic
            .get(&(room_id, day_of_week, semester_ordinal))
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }

    async fn insert_dated_schedule(&self, row: DatedScheduleRow) -> Result<(), StoreError> {
        self.dated.entry(row.room_id).or_default().push(row);
        Ok(())
    }

    async fn dated_schedules_overlapping(
        &self,
        room_id: RoomId,
        slot: Slot,
    ) -> Result<Vec<DatedScheduleRow>, StoreError> {
        Ok(self
            .dated
            .get(&room_id)
            .map(|e| {
                e.value()
                    .iter()
                    .filter(|s| s.slot.overlaps(&slot))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_dated_schedules(&self) -> Result<Vec<DatedScheduleRow>, StoreError> {
        let mut rows: Vec<DatedScheduleRow> = self
            .dated
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        rows.sort_by_key(|r| r.slot.start);
        Ok(rows)
    }

    async fn insert_reservation(&self, row: ReservationRow) -> Result<(), StoreError> {
        self.reservations.insert(row.id, row);
        Ok(())
    }

    async fn reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<ReservationRow>, StoreError> {
        Ok(self.reservations.get(&id).map(|e| e.value().clone()))
    }

    async fn approved_reservations_on(
        &self,
        room_id: RoomId,
        dates: &[NaiveDate],
    ) -> Result<Vec<ReservationRow>, StoreError> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| {
                let r = e.value();
                r.room_id == room_id
                    && r.status == ReservationStatus::Approved
                    && dates.contains(&r.reservation_date)
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn update_reservation_decision(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        admin_id: UserId,
        processed_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Option<ReservationRow>, StoreError> {
        match self.reservations.get_mut(&id) {
            Some(mut e) => {
                let row = e.value_mut();
                row.status = status;
                row.processed_by_admin_id = Some(admin_id);
                row.processed_at = Some(processed_at);
                row.admin_notes = notes;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn reservations_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReservationRow>, StoreError> {
        let mut rows: Vec<ReservationRow> = self
            .reservations
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn all_reservations(&self) -> Result<Vec<ReservationRow>, StoreError> {
        let mut rows: Vec<ReservationRow> =
            self.reservations.iter().map(|e| e.value().clone()).collect();
        rows.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn profile_by_id(&self, id: UserId) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.profiles.get(&id).map(|e| e.value().clone()))
    }
}
