use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    /// A user's reservations, newest request first.
    pub async fn find_my_reservations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReservationRecord>, EngineError> {
        let rows = self.store.reservations_for_user(user_id).await?;
        // The requesting user is the same for every row; resolve once.
        let requesting_user = self.user_info(user_id).await;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(
                self.reservation_record_with_user(row, requesting_user.clone())
                    .await?,
            );
        }
        Ok(records)
    }

    /// Every reservation, newest request first, with requesting and
    /// processing user display info resolved per row.
    pub async fn find_all_reservations_for_admin(
        &self,
    ) -> Result<Vec<ReservationRecord>, EngineError> {
        let rows = self.store.all_reservations().await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(self.reservation_record(row).await?);
        }
        Ok(records)
    }

    /// All dated schedules ordered by start, joined with course and room
    /// display fields. Missing joins degrade to `None`, they don't fail the
    /// listing.
    pub async fn list_dated_schedules(&self) -> Result<Vec<DatedScheduleRecord>, EngineError> {
        let rows = self.store.list_dated_schedules().await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let course = self.store.course_by_id(row.course_id).await?;
            let room = self.store.room_by_id(row.room_id).await?;
            let (room_code, room_name) = match room {
                Some(r) => (Some(r.code), Some(r.name)),
                None => (None, None),
            };
            records.push(DatedScheduleRecord {
                id: row.id,
                course_name: course.map(|c| c.name),
                room_code,
                room_name,
                lecturer_name: row.lecturer_name,
                starts_at: row.slot.start,
                ends_at: row.slot.end,
                semester: row.semester,
            });
        }
        Ok(records)
    }

    /// Denormalize a reservation row for the boundary: room display fields
    /// (degrading to "N/A" when the room is gone) and best-effort user info.
    pub(super) async fn reservation_record(
        &self,
        row: &ReservationRow,
    ) -> Result<ReservationRecord, EngineError> {
        let requesting_user = self.user_info(row.user_id).await;
        self.reservation_record_with_user(row, requesting_user).await
    }

    pub(super) async fn reservation_record_with_user(
        &self,
        row: &ReservationRow,
        requesting_user: UserInfo,
    ) -> Result<ReservationRecord, EngineError> {
        let (room_code, room_name) = match self.store.room_by_id(row.room_id).await? {
            Some(room) => (room.code, room.name),
            None => ("N/A".to_owned(), "N/A".to_owned()),
        };
        let processed_by_admin = match row.processed_by_admin_id {
            Some(admin_id) => Some(self.user_info(admin_id).await),
            None => None,
        };
        Ok(ReservationRecord {
            id: row.id,
            room_code,
            room_name,
            requesting_user,
            purpose: row.purpose.clone(),
            reservation_date: row.reservation_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            requested_at: row.requested_at,
            processed_by_admin,
            processed_at: row.processed_at,
            admin_notes: row.admin_notes.clone(),
        })
    }
}
