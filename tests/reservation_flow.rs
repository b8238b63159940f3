//! End-to-end reservation flow through the public API, including the JSON
//! wire shapes an embedding transport layer would use.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use ruang::model::{
    CreateAcademicScheduleRequest, CreateReservationRequest, DecideReservationRequest,
    ReservationStatus,
};
use ruang::{Engine, EngineError, Fault, InMemoryStore, NotifyHub};

fn setup() -> (Engine, Arc<InMemoryStore>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = Arc::new(InMemoryStore::new());
    let engine = Engine::new(store.clone(), Arc::new(NotifyHub::new()));
    (engine, store)
}

fn future_date(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn request_to_approval_round_trip() {
    let (engine, store) = setup();
    let room = store.seed_room("R101", "Ruang Seminar Utama", 80);
    let user = store.seed_profile("Budi Santoso", "budi");
    let admin = store.seed_profile("Ani Admin", "ani");
    let date = future_date(21);

    // A transport layer hands us a camelCase JSON body.
    let req: CreateReservationRequest = serde_json::from_value(json!({
        "roomCode": "R101",
        "purpose": "Seminar tugas akhir",
        "reservationDate": date,
        "startTime": "09:00",
        "endTime": "10:00",
    }))
    .unwrap();
    let created = engine.create_reservation(user.id, req).await.unwrap();
    assert_eq!(created.status, ReservationStatus::Pending);

    // The record serializes back in wire format.
    let body = serde_json::to_value(&created).unwrap();
    assert_eq!(body["roomCode"], "R101");
    assert_eq!(body["roomName"], "Ruang Seminar Utama");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["reservationDate"], date);
    assert_eq!(body["startTime"], "09:00:00");
    assert_eq!(body["requestingUser"]["fullName"], "Budi Santoso");
    assert!(body["processedByAdmin"].is_null());

    let decide: DecideReservationRequest = serde_json::from_value(json!({
        "decision": "approved",
        "adminNotes": "silakan",
    }))
    .unwrap();
    let decided = engine
        .update_reservation_status(created.id, admin.id, decide)
        .await
        .unwrap();

    let body = serde_json::to_value(&decided).unwrap();
    assert_eq!(body["status"], "approved");
    assert_eq!(body["adminNotes"], "silakan");
    assert_eq!(body["processedByAdmin"]["fullName"], "Ani Admin");
    assert!(!body["processedAt"].is_null());

    // The approved slot is occupied now; an overlapping request bounces.
    let overlap: CreateReservationRequest = serde_json::from_value(json!({
        "roomCode": "R101",
        "purpose": "Rapat dadakan",
        "reservationDate": date,
        "startTime": "09:30",
        "endTime": "10:30",
    }))
    .unwrap();
    let err = engine.create_reservation(user.id, overlap).await.unwrap_err();
    assert!(matches!(err, EngineError::SlotUnavailable));
    assert_eq!(err.fault(), Fault::Conflict);

    // The materialized schedule shows up in the dated listing.
    let schedules = engine.list_dated_schedules().await.unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].course_name.as_deref(), Some("Seminar tugas akhir"));
    assert_eq!(schedules[0].room_code.as_deref(), Some("R101"));

    // And the booking is visible in both projections.
    let mine = engine.find_my_reservations(user.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, ReservationStatus::Approved);
    let all = engine.find_all_reservations_for_admin().await.unwrap();
    assert_eq!(all.len(), 1);

    let slot = mine[0].reservation_date.and_time(mine[0].start_time);
    let end = mine[0].reservation_date.and_time(mine[0].end_time);
    assert!(!engine.is_room_available(room.id, slot, end, None).await.unwrap());
}

#[tokio::test]
async fn academic_schedule_wire_round_trip() {
    let (engine, store) = setup();
    store.seed_room("R101", "Ruang Kelas 101", 40);

    let req: CreateAcademicScheduleRequest = serde_json::from_value(json!({
        "courseName": "Basis Data",
        "courseCode": "IF2240",
        "roomCode": "R101",
        "lecturerName": "Dr. Sari Wahyuni",
        "semesterOrdinal": 3,
        "dayOfWeek": 1,
        "startTime": "08:00",
        "endTime": "09:30",
    }))
    .unwrap();
    let record = engine.create_academic_schedule(req.clone()).await.unwrap();

    let body = serde_json::to_value(&record).unwrap();
    assert_eq!(body["courseCode"], "IF2240");
    assert_eq!(body["parity"], "ganjil");
    assert_eq!(body["dayOfWeek"], 1);
    assert_eq!(body["startTime"], "08:00:00");
    assert_eq!(body["endTime"], "09:30:00");

    // Scenario E: an overlapping rule on the same key is a conflict.
    let mut overlapping = req;
    overlapping.start_time = "09:00".into();
    overlapping.end_time = "10:00".into();
    let err = engine.create_academic_schedule(overlapping).await.unwrap_err();
    assert_eq!(err.fault(), Fault::Conflict);
    let message = err.to_string();
    assert!(message.contains("R101"));
    assert!(message.contains("semester 3"));
}

#[tokio::test]
async fn rejected_reservation_frees_nothing_because_nothing_was_taken() {
    let (engine, store) = setup();
    let room = store.seed_room("R102", "Studio Musik", 15);
    let user = store.seed_profile("Citra Lestari", "citra");
    let date = future_date(14);

    let created = engine
        .create_reservation(
            user.id,
            serde_json::from_value(json!({
                "roomCode": "R102",
                "purpose": "Latihan band",
                "reservationDate": date,
                "startTime": "19:00",
                "endTime": "21:00",
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let decided = engine
        .update_reservation_status(
            created.id,
            user.id,
            serde_json::from_value(json!({ "decision": "rejected" })).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(decided.status, ReservationStatus::Rejected);
    assert!(decided.admin_notes.is_none());

    let start = decided.reservation_date.and_time(decided.start_time);
    let end = decided.reservation_date.and_time(decided.end_time);
    assert!(engine.is_room_available(room.id, start, end, None).await.unwrap());
    assert!(engine.list_dated_schedules().await.unwrap().is_empty());
}
