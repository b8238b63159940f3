use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// Validate the recurring-rule key inputs before any store access.
pub(crate) fn validate_rule_key(day_of_week: u8, semester_ordinal: u8) -> Result<(), EngineError> {
    if day_of_week > MAX_DAY_OF_WEEK {
        return Err(EngineError::InvalidDayOfWeek(day_of_week));
    }
    if !(MIN_SEMESTER_ORDINAL..=MAX_SEMESTER_ORDINAL).contains(&semester_ordinal) {
        return Err(EngineError::InvalidSemesterOrdinal(semester_ordinal));
    }
    Ok(())
}

/// Recurring rules conflict on time-of-day overlap within the same
/// (room, day-of-week, semester-ordinal) key. Half-open: a rule ending
/// exactly when another starts is not a conflict.
pub(crate) fn find_rule_conflict<'a>(
    rules: &'a [AcademicScheduleRow],
    window: &DayWindow,
) -> Option<&'a AcademicScheduleRow> {
    rules.iter().find(|r| r.window.overlaps(window))
}
