use chrono::NaiveTime;
use ulid::Ulid;

use crate::clock::InvalidTimeValue;
use crate::model::ReservationStatus;
use crate::store::StoreError;

/// How a failed operation should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Malformed input, rejected before any store access.
    Validation,
    /// The identified entity does not exist.
    NotFound,
    /// The request is well-formed but loses to current state; retry with
    /// different parameters, not verbatim.
    Conflict,
    /// The store failed; the engine does not retry.
    Dependency,
}

#[derive(Debug)]
pub enum EngineError {
    InvalidTimeValue(InvalidTimeValue),
    InvalidRange,
    InvalidDayOfWeek(u8),
    InvalidSemesterOrdinal(u8),
    PastStartTime,
    LimitExceeded(&'static str),
    RoomNotFound(String),
    ReservationNotFound(Ulid),
    ScheduleConflict {
        room_code: String,
        day_of_week: u8,
        semester_ordinal: u8,
        start: NaiveTime,
        end: NaiveTime,
    },
    SlotUnavailable,
    AlreadyProcessed {
        id: Ulid,
        status: ReservationStatus,
    },
    Store(StoreError),
}

impl EngineError {
    pub fn fault(&self) -> Fault {
        match self {
            EngineError::InvalidTimeValue(_)
            | EngineError::InvalidRange
            | EngineError::InvalidDayOfWeek(_)
            | EngineError::InvalidSemesterOrdinal(_)
            | EngineError::PastStartTime
            | EngineError::LimitExceeded(_) => Fault::Validation,
            EngineError::RoomNotFound(_) | EngineError::ReservationNotFound(_) => Fault::NotFound,
            EngineError::ScheduleConflict { .. }
            | EngineError::SlotUnavailable
            | EngineError::AlreadyProcessed { .. } => Fault::Conflict,
            EngineError::Store(_) => Fault::Dependency,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidTimeValue(e) => write!(f, "{e}"),
            EngineError::InvalidRange => write!(f, "end time must be after start time"),
            EngineError::InvalidDayOfWeek(day) => {
                write!(f, "day of week must be 0 (Sunday) through 6 (Saturday), got {day}")
            }
            EngineError::InvalidSemesterOrdinal(n) => {
                write!(f, "semester ordinal must be 1 through 14, got {n}")
            }
            EngineError::PastStartTime => {
                write!(f, "reservation start time cannot be in the past")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::RoomNotFound(code) => write!(f, "room not found: {code}"),
            EngineError::ReservationNotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::ScheduleConflict {
                room_code,
                day_of_week,
                semester_ordinal,
                start,
                end,
            } => write!(
                f,
                "room {room_code} on day {day_of_week}, semester {semester_ordinal}, already has an overlapping schedule between {start}-{end}"
            ),
            EngineError::SlotUnavailable => {
                write!(f, "the selected time slot for this room is not available")
            }
            EngineError::AlreadyProcessed { id, status } => {
                write!(f, "reservation {id} has already been processed: {status}")
            }
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

impl From<InvalidTimeValue> for EngineError {
    fn from(e: InvalidTimeValue) -> Self {
        EngineError::InvalidTimeValue(e)
    }
}
