//! Record Store collaborator.
//!
//! `RecordStore` is the async boundary the lifecycle manager and review gate
//! talk to. Each call is all-or-nothing. `SqliteStore` is the local adapter:
//! it runs repository functions on the blocking pool against one shared
//! connection.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(DatabaseError),
    /// A uniqueness or check constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConstraintViolation(msg) => StoreError::Conflict(msg),
            other => StoreError::Database(other),
        }
    }
}

/// Durable appointment / review / profile records.
pub trait RecordStore: Send + Sync + 'static {
    fn insert_appointment(
        &self,
        appointment: Appointment,
    ) -> impl Future<Output = Result<Appointment, StoreError>> + Send;

    fn get_appointment(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Appointment>, StoreError>> + Send;

    fn update_appointment(
        &self,
        appointment: Appointment,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_appointment(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn query_appointments(
        &self,
        filter: AppointmentFilter,
        order: AppointmentOrder,
    ) -> impl Future<Output = Result<Vec<Appointment>, StoreError>> + Send;

    fn insert_review(&self, review: Review) -> impl Future<Output = Result<Review, StoreError>> + Send;

    fn query_reviews(
        &self,
        filter: ReviewFilter,
    ) -> impl Future<Output = Result<Vec<Review>, StoreError>> + Send;

    fn get_profile(&self, id: Uuid) -> impl Future<Output = Result<Option<Profile>, StoreError>> + Send;

    fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, StoreError>> + Send;
}

/// Resolves a notification recipient from an owner id.
pub trait ProfileDirectory: Send + Sync + 'static {
    fn email_for(&self, owner_id: Uuid)
        -> impl Future<Output = Result<Option<String>, StoreError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// SQLite adapter
// ═══════════════════════════════════════════════════════════

/// SQLite-backed store. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Record store opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `op` against the connection on the blocking pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
            op(&guard).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store worker failed: {e}")))?
    }

    /// Verify a bearer session written by the auth service.
    pub async fn session_user(
        &self,
        token_hash: String,
        now: NaiveDateTime,
    ) -> Result<Option<Uuid>, StoreError> {
        self.run(move |conn| db::find_session_user(conn, &token_hash, &now))
            .await
    }
}

impl RecordStore for SqliteStore {
    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        self.run(move |conn| {
            db::insert_appointment(conn, &appointment)?;
            Ok(appointment)
        })
        .await
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        self.run(move |conn| db::get_appointment(conn, &id)).await
    }

    async fn update_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let id = appointment.id;
        self.run(move |conn| db::update_appointment(conn, &appointment))
            .await
            .map_err(|e| not_found_as(e, "Appointment", id))
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<(), StoreError> {
        self.run(move |conn| db::delete_appointment(conn, &id))
            .await
            .map_err(|e| not_found_as(e, "Appointment", id))
    }

    async fn query_appointments(
        &self,
        filter: AppointmentFilter,
        order: AppointmentOrder,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.run(move |conn| db::query_appointments(conn, &filter, order))
            .await
    }

    async fn insert_review(&self, review: Review) -> Result<Review, StoreError> {
        self.run(move |conn| {
            db::insert_review(conn, &review)?;
            Ok(review)
        })
        .await
    }

    async fn query_reviews(&self, filter: ReviewFilter) -> Result<Vec<Review>, StoreError> {
        self.run(move |conn| db::query_reviews(conn, &filter)).await
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.run(move |conn| db::get_profile(conn, &id)).await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        self.run(db::list_profiles).await
    }
}

impl ProfileDirectory for SqliteStore {
    async fn email_for(&self, owner_id: Uuid) -> Result<Option<String>, StoreError> {
        let profile = self.get_profile(owner_id).await?;
        Ok(profile.and_then(|p| p.email).filter(|email| !email.trim().is_empty()))
    }
}

fn not_found_as(err: StoreError, entity: &'static str, id: Uuid) -> StoreError {
    match err {
        StoreError::Database(DatabaseError::NotFound { .. }) => StoreError::NotFound { entity, id },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(owner: Option<Uuid>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            owner_id: owner,
            full_name: "Jane Doe".into(),
            service_type: ServiceType::MensHaircut,
            date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            time: "10:00".into(),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: NaiveDate::from_ymd_opt(2026, 10, 16)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let appt = store.insert_appointment(sample(Some(Uuid::new_v4()))).await.unwrap();
        let loaded = store.get_appointment(appt.id).await.unwrap();
        assert_eq!(loaded, Some(appt));
    }

    #[tokio::test]
    async fn update_missing_maps_to_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.update_appointment(sample(None)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Appointment", .. }));
    }

    #[tokio::test]
    async fn delete_missing_maps_to_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.delete_appointment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_review_is_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let appt = store.insert_appointment(sample(Some(owner))).await.unwrap();
        let review = Review {
            id: Uuid::new_v4(),
            appointment_id: appt.id,
            owner_id: owner,
            barber_name: appt.full_name.clone(),
            service_type: appt.service_type,
            rating: 5,
            comment: None,
            created_at: appt.created_at,
        };
        store.insert_review(review.clone()).await.unwrap();
        let again = Review {
            id: Uuid::new_v4(),
            ..review
        };
        assert!(matches!(
            store.insert_review(again).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_row_is_not_a_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        let appt = store.insert_appointment(sample(Some(Uuid::new_v4()))).await.unwrap();
        let id = appt.id.to_string();
        store
            .run(move |conn| {
                conn.execute(
                    "UPDATE appointments SET appointment_date = '17/10/2026' WHERE id = ?1",
                    [id],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.get_appointment(appt.id).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Database(DatabaseError::Decode {
                column: "appointments.appointment_date",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn email_for_skips_blank_addresses() {
        let store = SqliteStore::open_in_memory().unwrap();
        let with_email = Uuid::new_v4();
        let blank = Uuid::new_v4();
        let created_at = sample(None).created_at;
        store
            .run(move |conn| {
                db::upsert_profile(
                    conn,
                    &Profile {
                        id: with_email,
                        full_name: Some("Jane".into()),
                        email: Some("jane@example.com".into()),
                        created_at,
                    },
                )?;
                db::upsert_profile(
                    conn,
                    &Profile {
                        id: blank,
                        full_name: None,
                        email: Some("  ".into()),
                        created_at,
                    },
                )
            })
            .await
            .unwrap();

        assert_eq!(
            store.email_for(with_email).await.unwrap().as_deref(),
            Some("jane@example.com")
        );
        assert_eq!(store.email_for(blank).await.unwrap(), None);
        assert_eq!(store.email_for(Uuid::new_v4()).await.unwrap(), None);
    }
}
