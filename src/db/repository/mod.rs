//! Repository layer: table-scoped database operations.
//!
//! Plain functions over a borrowed `&Connection`; async callers go through
//! `store::SqliteStore`, which runs these on the blocking pool.

mod access;
mod appointment;
mod profile;
mod review;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::DatabaseError;

/// Timestamp column format. Second precision keeps values comparable as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub use access::*;
pub use appointment::*;
pub use profile::*;
pub use review::*;

fn decode_error(column: &'static str, raw: &str, reason: impl ToString) -> DatabaseError {
    DatabaseError::Decode {
        column,
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn parse_uuid(column: &'static str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| decode_error(column, raw, e))
}

pub(crate) fn parse_timestamp(column: &'static str, raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| decode_error(column, raw, e))
}

pub(crate) fn parse_day(column: &'static str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| decode_error(column, raw, e))
}

pub(crate) fn parse_rating(raw: i64) -> Result<u8, DatabaseError> {
    u8::try_from(raw)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| decode_error("rating", &raw.to_string(), "outside 1..=5"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).unwrap()
    }

    fn make_appointment(owner: Option<Uuid>, date: &str, time: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            owner_id: owner,
            full_name: "Jane Doe".into(),
            service_type: ServiceType::MensHaircut,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: time.into(),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: ts("2026-10-16 09:00:00"),
        }
    }

    fn make_review(appointment: &Appointment, rating: u8) -> Review {
        Review {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            owner_id: appointment.owner_id.unwrap(),
            barber_name: appointment.full_name.clone(),
            service_type: appointment.service_type,
            rating,
            comment: Some("Great cut".into()),
            created_at: ts("2026-10-20 12:00:00"),
        }
    }

    #[test]
    fn appointment_insert_and_retrieve() {
        let conn = test_db();
        let owner = Uuid::new_v4();
        let appt = make_appointment(Some(owner), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded, appt);
    }

    #[test]
    fn walk_in_appointment_has_no_owner() {
        let conn = test_db();
        let appt = make_appointment(None, "2026-10-17", "11:00");
        insert_appointment(&conn, &appt).unwrap();
        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert!(loaded.owner_id.is_none());
    }

    #[test]
    fn missing_appointment_is_none() {
        let conn = test_db();
        assert!(get_appointment(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_overwrites_mutable_fields() {
        let conn = test_db();
        let mut appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();

        appt.status = AppointmentStatus::Confirmed;
        appt.time = "14:00".into();
        appt.notes = Some("Skin fade".into());
        update_appointment(&conn, &appt).unwrap();

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Confirmed);
        assert_eq!(loaded.time, "14:00");
        assert_eq!(loaded.notes.as_deref(), Some("Skin fade"));
    }

    #[test]
    fn update_missing_appointment_not_found() {
        let conn = test_db();
        let appt = make_appointment(None, "2026-10-17", "10:00");
        let err = update_appointment(&conn, &appt).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_row() {
        let conn = test_db();
        let appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();
        delete_appointment(&conn, &appt.id).unwrap();
        assert!(get_appointment(&conn, &appt.id).unwrap().is_none());
        assert!(matches!(
            delete_appointment(&conn, &appt.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn query_filters_by_owner_and_orders_chronologically() {
        let conn = test_db();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let late = make_appointment(Some(alice), "2026-10-20", "09:00");
        let early = make_appointment(Some(alice), "2026-10-18", "15:00");
        let same_day_earlier = make_appointment(Some(alice), "2026-10-18", "08:00");
        let other = make_appointment(Some(bob), "2026-10-17", "10:00");
        for appt in [&late, &early, &same_day_earlier, &other] {
            insert_appointment(&conn, appt).unwrap();
        }

        let filter = AppointmentFilter {
            owner_id: Some(alice),
            ..Default::default()
        };
        let found = query_appointments(&conn, &filter, AppointmentOrder::Chronological).unwrap();
        let ids: Vec<Uuid> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![same_day_earlier.id, early.id, late.id]);
    }

    #[test]
    fn query_filters_by_status_and_date_range() {
        let conn = test_db();
        let owner = Some(Uuid::new_v4());
        let mut confirmed = make_appointment(owner, "2026-10-18", "10:00");
        confirmed.status = AppointmentStatus::Confirmed;
        let pending = make_appointment(owner, "2026-10-18", "11:00");
        let mut confirmed_later = make_appointment(owner, "2026-10-25", "10:00");
        confirmed_later.status = AppointmentStatus::Confirmed;
        for appt in [&confirmed, &pending, &confirmed_later] {
            insert_appointment(&conn, appt).unwrap();
        }

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Confirmed),
            date_from: Some(day),
            date_to: Some(day),
            ..Default::default()
        };
        let found = query_appointments(&conn, &filter, AppointmentOrder::Chronological).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, confirmed.id);
    }

    #[test]
    fn notes_longer_than_limit_rejected_by_store() {
        let conn = test_db();
        let mut appt = make_appointment(None, "2026-10-17", "10:00");
        appt.notes = Some("x".repeat(501));
        let err = insert_appointment(&conn, &appt).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn review_unique_per_appointment_and_owner() {
        let conn = test_db();
        let appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();

        insert_review(&conn, &make_review(&appt, 5)).unwrap();
        let err = insert_review(&conn, &make_review(&appt, 3)).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn review_query_filters() {
        let conn = test_db();
        let first = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        let mut second = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "11:00");
        second.service_type = ServiceType::BeardTrim;
        second.full_name = "Sam".into();
        insert_appointment(&conn, &first).unwrap();
        insert_appointment(&conn, &second).unwrap();
        insert_review(&conn, &make_review(&first, 5)).unwrap();
        insert_review(&conn, &make_review(&second, 4)).unwrap();

        let by_service = query_reviews(
            &conn,
            &ReviewFilter {
                service_type: Some(ServiceType::BeardTrim),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_service.len(), 1);
        assert_eq!(by_service[0].barber_name, "Sam");

        let by_appointment = query_reviews(
            &conn,
            &ReviewFilter {
                appointment_id: Some(first.id),
                owner_id: first.owner_id,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_appointment.len(), 1);
        assert_eq!(by_appointment[0].rating, 5);

        assert_eq!(query_reviews(&conn, &ReviewFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn deleting_appointment_cascades_to_review() {
        let conn = test_db();
        let appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();
        insert_review(&conn, &make_review(&appt, 5)).unwrap();
        delete_appointment(&conn, &appt.id).unwrap();
        assert!(query_reviews(&conn, &ReviewFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn profile_upsert_and_list() {
        let conn = test_db();
        let id = Uuid::new_v4();
        let mut profile = Profile {
            id,
            full_name: Some("Jane Doe".into()),
            email: Some("jane@example.com".into()),
            created_at: ts("2026-10-01 08:00:00"),
        };
        upsert_profile(&conn, &profile).unwrap();
        profile.email = Some("jane.doe@example.com".into());
        upsert_profile(&conn, &profile).unwrap();

        let loaded = get_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(loaded.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(list_profiles(&conn).unwrap().len(), 1);
        assert!(get_profile(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn role_grant_is_idempotent() {
        let conn = test_db();
        let user = Uuid::new_v4();
        assert!(!has_role(&conn, &user, Role::Admin).unwrap());
        grant_role(&conn, &user, Role::Admin).unwrap();
        grant_role(&conn, &user, Role::Admin).unwrap();
        assert!(has_role(&conn, &user, Role::Admin).unwrap());
        assert!(!has_role(&conn, &Uuid::new_v4(), Role::Admin).unwrap());
    }

    #[test]
    fn corrupt_appointment_row_is_decode_error() {
        let conn = test_db();
        let appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();
        conn.execute(
            "UPDATE appointments SET created_at = 'yesterday' WHERE id = ?1",
            [appt.id.to_string()],
        )
        .unwrap();

        let err = get_appointment(&conn, &appt.id).unwrap_err();
        match err {
            DatabaseError::Decode { column, value, .. } => {
                assert_eq!(column, "appointments.created_at");
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_owner_id_is_decode_error() {
        let conn = test_db();
        let appt = make_appointment(Some(Uuid::new_v4()), "2026-10-17", "10:00");
        insert_appointment(&conn, &appt).unwrap();
        conn.execute(
            "UPDATE appointments SET user_id = 'not-a-uuid' WHERE id = ?1",
            [appt.id.to_string()],
        )
        .unwrap();

        let err = query_appointments(&conn, &AppointmentFilter::default(), AppointmentOrder::Chronological)
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Decode { column: "appointments.user_id", .. }));
    }

    #[test]
    fn session_lookup_honours_expiry() {
        let conn = test_db();
        let user = Uuid::new_v4();
        insert_session(&conn, "abc", &user, &ts("2026-10-16 12:00:00")).unwrap();

        assert_eq!(
            find_session_user(&conn, "abc", &ts("2026-10-16 11:59:59")).unwrap(),
            Some(user)
        );
        assert_eq!(find_session_user(&conn, "abc", &ts("2026-10-16 12:00:00")).unwrap(), None);
        assert_eq!(find_session_user(&conn, "zzz", &ts("2026-10-16 10:00:00")).unwrap(), None);
    }
}
