use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::*;
use crate::observability;

use super::{Engine, EngineError};

/// Calendar dates a probe interval touches: its start date, plus the end date
/// when the interval crosses midnight. Used to scope the coarse reservation
/// query before the precise filter runs.
pub fn touched_dates(slot: &Slot) -> Vec<NaiveDate> {
    let start_date = slot.start.date();
    let end_date = slot.end.date();
    if start_date == end_date {
        vec![start_date]
    } else {
        vec![start_date, end_date]
    }
}

/// Precise filter over the coarse candidates: combine each row's stored date
/// and times back into an absolute slot and apply the overlap law.
/// `exclude` skips the reservation currently being re-validated.
pub fn reservation_conflicts(
    candidates: &[ReservationRow],
    probe: &Slot,
    exclude: Option<ReservationId>,
) -> bool {
    candidates.iter().any(|r| {
        if exclude.is_some_and(|ex| ex == r.id) {
            return false;
        }
        r.slot().overlaps(probe)
    })
}

impl Engine {
    /// Two-phase availability check for a room over `[start, end)`.
    ///
    /// Phase 1 consults the dated-schedule registry (absolute overlap the
    /// store resolves against its indexed timestamp columns) and
    /// short-circuits on any hit. Phase 2 fetches approved reservations
    /// scoped by the touched calendar dates and filters precisely here.
    /// Read-only and idempotent.
    pub async fn is_room_available(
        &self,
        room_id: RoomId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<ReservationId>,
    ) -> Result<bool, EngineError> {
        let started = Instant::now();
        let probe = Slot::new(start, end);

        let available = if !self
            .store
            .dated_schedules_overlapping(room_id, probe)
            .await?
            .is_empty()
        {
            false
        } else {
            let candidates = self
                .store
                .approved_reservations_on(room_id, &touched_dates(&probe))
                .await?;
            !reservation_conflicts(&candidates, &probe, exclude)
        };

        metrics::histogram!(observability::AVAILABILITY_CHECK_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(
            observability::AVAILABILITY_CHECKS_TOTAL,
            "available" => if available { "true" } else { "false" }
        )
        .increment(1);
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use ulid::Ulid;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    fn approved(date: &str, start: &str, end: &str) -> ReservationRow {
        ReservationRow {
            id: Ulid::new(),
            room_id: Ulid::new(),
            user_id: Ulid::new(),
            purpose: "Workshop".into(),
            reservation_date: d(date),
            start_time: t(start),
            end_time: t(end),
            status: ReservationStatus::Approved,
            requested_at: Utc::now(),
            processed_by_admin_id: None,
            processed_at: None,
            admin_notes: None,
        }
    }

    #[test]
    fn touched_dates_same_day() {
        let slot = Slot::on(d("2025-06-10"), t("09:00:00"), t("10:00:00"));
        assert_eq!(touched_dates(&slot), vec![d("2025-06-10")]);
    }

    #[test]
    fn touched_dates_across_midnight() {
        let slot = Slot::new(
            d("2025-06-10").and_time(t("22:00:00")),
            d("2025-06-11").and_time(t("01:00:00")),
        );
        assert_eq!(touched_dates(&slot), vec![d("2025-06-10"), d("2025-06-11")]);
    }

    #[test]
    fn conflict_on_overlap() {
        let rows = vec![approved("2025-06-10", "09:00:00", "10:00:00")];
        let probe = Slot::on(d("2025-06-10"), t("09:30:00"), t("10:30:00"));
        assert!(reservation_conflicts(&rows, &probe, None));
    }

    #[test]
    fn no_conflict_at_boundary() {
        // Ends exactly when the probe starts: half-open, not a conflict.
        let rows = vec![approved("2025-06-10", "09:00:00", "10:00:00")];
        let probe = Slot::on(d("2025-06-10"), t("10:00:00"), t("11:00:00"));
        assert!(!reservation_conflicts(&rows, &probe, None));
    }

    #[test]
    fn exclusion_skips_own_row() {
        let row = approved("2025-06-10", "09:00:00", "10:00:00");
        let id = row.id;
        let rows = vec![row];
        let probe = Slot::on(d("2025-06-10"), t("09:00:00"), t("10:00:00"));
        assert!(reservation_conflicts(&rows, &probe, None));
        assert!(!reservation_conflicts(&rows, &probe, Some(id)));
    }
}
