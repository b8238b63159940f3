use chrono::{NaiveDateTime, Utc};
use ulid::Ulid;

use crate::clock;
use crate::clock::InvalidTimeValue;
use crate::limits::*;
use crate::model::*;
use crate::observability;
use crate::store::StoreError;

use super::conflict::{find_rule_conflict, validate_rule_key};
use super::{Engine, EngineError};

impl Engine {
    /// Create a recurring weekly class rule.
    ///
    /// Conflicts are checked against the rules sharing the room, day-of-week
    /// and semester-ordinal key, on time-of-day overlap. The check and the
    /// insert run under the room lock; the store's uniqueness constraint
    /// still fences exact-duplicate races.
    pub async fn create_academic_schedule(
        &self,
        req: CreateAcademicScheduleRequest,
    ) -> Result<AcademicScheduleRecord, EngineError> {
        if req.course_code.len() > MAX_CODE_LEN || req.room_code.len() > MAX_CODE_LEN {
            return Err(EngineError::LimitExceeded("code too long"));
        }
        if req.course_name.len() > MAX_NAME_LEN || req.lecturer_name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name too long"));
        }
        validate_rule_key(req.day_of_week, req.semester_ordinal)?;
        let start = clock::parse_time(&req.start_time)
            .ok_or_else(|| InvalidTimeValue(req.start_time.clone()))?;
        let end = clock::parse_time(&req.end_time)
            .ok_or_else(|| InvalidTimeValue(req.end_time.clone()))?;
        if end <= start {
            return Err(EngineError::InvalidRange);
        }
        let window = DayWindow::new(start, end);

        let room = self.require_room_by_code(&req.room_code).await?;
        let course = self
            .store
            .course_by_code_or_insert(&req.course_code, &req.course_name)
            .await?;
        let parity = SemesterParity::from_ordinal(req.semester_ordinal);
        let day_of_week = req.day_of_week;
        let semester_ordinal = req.semester_ordinal;

        let conflict = || EngineError::ScheduleConflict {
            room_code: room.code.clone(),
            day_of_week,
            semester_ordinal,
            start,
            end,
        };

        let lock = self.room_lock(room.id);
        let _guard = lock.lock().await;

        let existing = self
            .store
            .academic_rules_for(room.id, day_of_week, semester_ordinal)
            .await?;
        if find_rule_conflict(&existing, &window).is_some() {
            metrics::counter!(observability::CONFLICTS_TOTAL, "op" => "create_academic_schedule")
                .increment(1);
            tracing::warn!(
                "academic schedule conflict: room {} day {day_of_week} semester {semester_ordinal}",
                room.code
            );
            return Err(conflict());
        }

        let row = AcademicScheduleRow {
            id: Ulid::new(),
            room_id: room.id,
            course_id: course.id,
            lecturer_name: req.lecturer_name,
            semester_ordinal,
            parity,
            day_of_week,
            window,
            created_at: Utc::now(),
        };
        match self.store.insert_academic_rule(row.clone()).await {
            Ok(()) => {}
            // Exact-duplicate race lost against the store constraint.
            Err(StoreError::UniqueViolation(_)) => return Err(conflict()),
            Err(e) => return Err(e.into()),
        }

        metrics::counter!(observability::ACADEMIC_RULES_CREATED_TOTAL).increment(1);
        tracing::info!("academic schedule {} created for room {}", row.id, room.code);
        self.notify.send(
            room.id,
            &RoomEvent::AcademicRuleAdded {
                id: row.id,
                day_of_week: row.day_of_week,
                window,
            },
        );

        Ok(AcademicScheduleRecord {
            id: row.id,
            course_id: course.id,
            course_code: course.code,
            course_name: course.name,
            room_id: room.id,
            room_code: room.code,
            room_name: room.name,
            lecturer_name: row.lecturer_name,
            semester_ordinal: row.semester_ordinal,
            parity,
            day_of_week: row.day_of_week,
            start_time: window.start,
            end_time: window.end,
            created_at: row.created_at,
        })
    }

    /// Insert a one-off dated slot. Admin-facing, and the materialization
    /// target for approved reservations. No conflict check of its own: the
    /// approval path has already validated availability, and direct admin
    /// placements override.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_dated_schedule(
        &self,
        course_name: &str,
        course_code: &str,
        lecturer_name: &str,
        room_code: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        semester: u8,
    ) -> Result<DatedScheduleRecord, EngineError> {
        if course_code.len() > MAX_CODE_LEN {
            return Err(EngineError::LimitExceeded("code too long"));
        }
        if course_name.len() > MAX_NAME_LEN || lecturer_name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name too long"));
        }
        if end <= start {
            return Err(EngineError::InvalidRange);
        }
        let slot = Slot::new(start, end);

        let room = self.require_room_by_code(room_code).await?;
        let course = self
            .store
            .course_by_code_or_insert(course_code, course_name)
            .await?;

        let row = DatedScheduleRow {
            id: Ulid::new(),
            room_id: room.id,
            course_id: course.id,
            lecturer_name: lecturer_name.to_owned(),
            slot,
            semester,
            created_at: Utc::now(),
        };
        self.store.insert_dated_schedule(row.clone()).await?;

        tracing::info!("dated schedule {} created for room {}", row.id, room.code);
        self.notify
            .send(room.id, &RoomEvent::ScheduleAdded { id: row.id, slot });

        Ok(DatedScheduleRecord {
            id: row.id,
            course_name: Some(course.name),
            room_code: Some(room.code),
            room_name: Some(room.name),
            lecturer_name: row.lecturer_name,
            starts_at: slot.start,
            ends_at: slot.end,
            semester,
        })
    }

    /// Create a reservation request in `pending` state.
    ///
    /// The availability check here is advisory: pending rows never block
    /// anything, so no lock is taken. The binding check happens at approval.
    pub async fn create_reservation(
        &self,
        user_id: UserId,
        req: CreateReservationRequest,
    ) -> Result<ReservationRecord, EngineError> {
        if req.room_code.len() > MAX_CODE_LEN {
            return Err(EngineError::LimitExceeded("code too long"));
        }
        if req.purpose.len() > MAX_PURPOSE_LEN {
            return Err(EngineError::LimitExceeded("purpose too long"));
        }

        let room = self.require_room_by_code(&req.room_code).await?;

        let start = clock::combine(&req.reservation_date, &req.start_time)?;
        let end = clock::combine(&req.reservation_date, &req.end_time)?;
        if end <= start {
            return Err(EngineError::InvalidRange);
        }
        if start < clock::now_to_minute() {
            return Err(EngineError::PastStartTime);
        }

        if !self.is_room_available(room.id, start, end, None).await? {
            metrics::counter!(observability::CONFLICTS_TOTAL, "op" => "create_reservation")
                .increment(1);
            return Err(EngineError::SlotUnavailable);
        }

        let row = ReservationRow {
            id: Ulid::new(),
            room_id: room.id,
            user_id,
            purpose: req.purpose,
            reservation_date: start.date(),
            start_time: start.time(),
            end_time: end.time(),
            status: ReservationStatus::Pending,
            requested_at: Utc::now(),
            processed_by_admin_id: None,
            processed_at: None,
            admin_notes: None,
        };
        self.store.insert_reservation(row.clone()).await?;

        metrics::counter!(observability::RESERVATIONS_CREATED_TOTAL).increment(1);
        tracing::info!("reservation {} requested for room {}", row.id, room.code);
        self.notify.send(
            room.id,
            &RoomEvent::ReservationRequested {
                id: row.id,
                slot: row.slot(),
            },
        );

        self.reservation_record(&row).await
    }

    /// Decide a pending reservation. Single-shot: deciding a reservation that
    /// is no longer pending fails without touching state.
    ///
    /// An approval re-checks availability (excluding the reservation itself)
    /// under the room lock, so two overlapping approvals cannot interleave
    /// between check and write. The lock is released on every exit path when
    /// the guard drops.
    pub async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        admin_id: UserId,
        req: DecideReservationRequest,
    ) -> Result<ReservationRecord, EngineError> {
        if let Some(notes) = &req.admin_notes
            && notes.len() > MAX_NOTES_LEN
        {
            return Err(EngineError::LimitExceeded("notes too long"));
        }

        // First load resolves the room for lock selection and fast-fails
        // decided reservations without contending.
        let row = self
            .store
            .reservation(reservation_id)
            .await?
            .ok_or(EngineError::ReservationNotFound(reservation_id))?;
        if row.status != ReservationStatus::Pending {
            return Err(EngineError::AlreadyProcessed {
                id: reservation_id,
                status: row.status,
            });
        }

        let lock = self.room_lock(row.room_id);
        let _guard = lock.lock().await;

        // Re-load under the lock: another admin may have decided while we
        // waited.
        let row = self
            .store
            .reservation(reservation_id)
            .await?
            .ok_or(EngineError::ReservationNotFound(reservation_id))?;
        if row.status != ReservationStatus::Pending {
            return Err(EngineError::AlreadyProcessed {
                id: reservation_id,
                status: row.status,
            });
        }

        let slot = row.slot();
        let status = req.decision.into_status();

        if status == ReservationStatus::Approved
            && !self
                .is_room_available(row.room_id, slot.start, slot.end, Some(reservation_id))
                .await?
        {
            metrics::counter!(observability::CONFLICTS_TOTAL, "op" => "update_reservation_status")
                .increment(1);
            tracing::warn!(
                "reservation {reservation_id} can no longer be approved: slot taken"
            );
            return Err(EngineError::SlotUnavailable);
        }

        let updated = self
            .store
            .update_reservation_decision(
                reservation_id,
                status,
                admin_id,
                Utc::now(),
                req.admin_notes,
            )
            .await?
            .ok_or(EngineError::ReservationNotFound(reservation_id))?;

        metrics::counter!(
            observability::RESERVATION_DECISIONS_TOTAL,
            "decision" => req.decision.label()
        )
        .increment(1);
        tracing::info!("reservation {reservation_id} {status} by admin {admin_id}");

        if updated.status == ReservationStatus::Approved {
            if let Err(e) = self.materialize_reservation(&updated).await {
                // The approval already stands; this is an inconsistency to
                // reconcile, not a rollback.
                metrics::counter!(observability::MATERIALIZATION_FAILURES_TOTAL).increment(1);
                tracing::error!(
                    "CRITICAL: failed to create schedule for approved reservation {reservation_id}: {e}"
                );
            }
            self.notify.send(
                updated.room_id,
                &RoomEvent::ReservationApproved {
                    id: updated.id,
                    slot,
                },
            );
        } else {
            self.notify.send(
                updated.room_id,
                &RoomEvent::ReservationRejected { id: updated.id },
            );
        }

        self.reservation_record(&updated).await
    }

    /// Materialize an approved reservation into the dated-schedule registry:
    /// purpose as course name, a generated `RES-` code, requester as lecturer.
    async fn materialize_reservation(&self, row: &ReservationRow) -> Result<(), EngineError> {
        let room = self
            .store
            .room_by_id(row.room_id)
            .await?
            .ok_or_else(|| EngineError::RoomNotFound(row.room_id.to_string()))?;
        let lecturer = match self.store.profile_by_id(row.user_id).await {
            Ok(Some(p)) => p.full_name,
            _ => "Reserved User".to_owned(),
        };
        let course_code = format!("RES-{}", &row.id.to_string()[..8]);
        let slot = row.slot();
        self.create_dated_schedule(
            &row.purpose,
            &course_code,
            &lecturer,
            &room.code,
            slot.start,
            slot.end,
            0,
        )
        .await?;
        Ok(())
    }
}
