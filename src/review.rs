//! Review gate.
//!
//! A review may be written once per appointment, by its owner, after the
//! appointment is completed. Eligibility is re-checked against the store on
//! every submission; the store's `UNIQUE(appointment_id, user_id)` catches
//! two sessions racing past the check.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::lifecycle::{Clock, LifecycleError, ValidationError};
use crate::models::*;
use crate::roles::Actor;
use crate::store::{RecordStore, StoreError};

pub const COMMENT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub count: usize,
    /// Mean rating to one decimal, `None` when there are no reviews.
    pub average: Option<f64>,
}

pub fn summary(reviews: &[Review]) -> ReviewSummary {
    if reviews.is_empty() {
        return ReviewSummary {
            count: 0,
            average: None,
        };
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / reviews.len() as f64;
    ReviewSummary {
        count: reviews.len(),
        average: Some((mean * 10.0).round() / 10.0),
    }
}

pub fn validate_rating(rating: i64) -> Result<u8, ValidationError> {
    match u8::try_from(rating) {
        Ok(r @ 1..=5) => Ok(r),
        _ => Err(ValidationError::new("rating", "Rating must be between 1 and 5")),
    }
}

pub fn validate_comment(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(comment) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if comment.chars().count() > COMMENT_MAX_CHARS {
        return Err(ValidationError::new(
            "comment",
            "Comment must be less than 500 characters",
        ));
    }
    Ok(Some(comment.to_string()))
}

pub struct ReviewGate<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for ReviewGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RecordStore> ReviewGate<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Completed, owned, and not yet reviewed by its owner.
    pub async fn can_review(&self, appointment: &Appointment) -> Result<bool, LifecycleError> {
        if appointment.status != AppointmentStatus::Completed {
            return Ok(false);
        }
        let Some(owner_id) = appointment.owner_id else {
            return Ok(false);
        };
        let existing = self
            .store
            .query_reviews(ReviewFilter {
                appointment_id: Some(appointment.id),
                owner_id: Some(owner_id),
                ..Default::default()
            })
            .await?;
        Ok(existing.is_empty())
    }

    pub async fn submit(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, LifecycleError> {
        let rating = validate_rating(rating)?;
        let comment = validate_comment(comment.as_deref())?;

        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(LifecycleError::NotFound {
                entity: "Appointment",
                id: appointment_id,
            })?;

        if !appointment.is_owned_by(&actor.id) {
            return Err(LifecycleError::NotAuthorized);
        }
        if !self.can_review(&appointment).await? {
            return Err(LifecycleError::NotEligible(
                "appointment is not completed or was already reviewed".into(),
            ));
        }

        let review = Review {
            id: Uuid::new_v4(),
            appointment_id,
            owner_id: actor.id,
            barber_name: appointment.full_name.clone(),
            service_type: appointment.service_type,
            rating,
            comment,
            created_at: self.clock.now(),
        };

        match self.store.insert_review(review).await {
            Ok(review) => {
                tracing::info!(
                    appointment_id = %appointment_id,
                    review_id = %review.id,
                    rating = review.rating,
                    "Review submitted"
                );
                Ok(review)
            }
            Err(StoreError::Conflict(_)) => Err(LifecycleError::NotEligible(
                "appointment was already reviewed".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Appointments `actor` has already reviewed.
    pub async fn reviewed_appointment_ids(&self, actor: &Actor) -> Result<HashSet<Uuid>, LifecycleError> {
        let reviews = self
            .store
            .query_reviews(ReviewFilter {
                owner_id: Some(actor.id),
                ..Default::default()
            })
            .await?;
        Ok(reviews.into_iter().map(|r| r.appointment_id).collect())
    }

    /// Public listing, newest first.
    pub async fn list_public(&self, filter: ReviewFilter) -> Result<Vec<Review>, LifecycleError> {
        Ok(self.store.query_reviews(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{fixed_now, form, manager};
    use crate::lifecycle::FixedClock;
    use crate::store::SqliteStore;

    fn gate_for(store: &Arc<SqliteStore>) -> ReviewGate<SqliteStore> {
        ReviewGate::new(Arc::clone(store), Arc::new(FixedClock(fixed_now())))
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-1).is_err());
        assert!(validate_rating(300).is_err());
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
    }

    #[test]
    fn comment_bounds() {
        assert_eq!(validate_comment(Some("   ")).unwrap(), None);
        assert!(validate_comment(Some(&"c".repeat(501))).is_err());
        assert!(validate_comment(Some(&"c".repeat(500))).is_ok());
    }

    #[test]
    fn summary_rounds_to_one_decimal() {
        assert_eq!(summary(&[]).average, None);

        let review = |rating| Review {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            barber_name: "Sam".into(),
            service_type: ServiceType::BeardTrim,
            rating,
            comment: None,
            created_at: fixed_now(),
        };
        let s = summary(&[review(5), review(4), review(4)]);
        assert_eq!(s.count, 3);
        assert_eq!(s.average, Some(4.3));
    }

    #[tokio::test]
    async fn booking_to_review_scenario() {
        let (manager, mut rx) = manager();
        let gate = gate_for(manager.store());
        let user = Actor::standard(Uuid::new_v4());
        let admin = Actor::privileged(Uuid::new_v4());

        let appt = manager.create(&user, form("2026-10-17")).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.owner_id, Some(user.id));

        manager
            .transition_status(&admin, appt.id, "confirmed")
            .await
            .unwrap();
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, MessageKind::Confirmation);
        assert_eq!(notice.appointment.owner_id, Some(user.id));

        let confirmed = manager.get(&user, appt.id).await.unwrap();
        assert!(!gate.can_review(&confirmed).await.unwrap());

        let completed = manager
            .transition_status(&admin, appt.id, "completed")
            .await
            .unwrap()
            .appointment;
        assert!(gate.can_review(&completed).await.unwrap());

        let review = gate
            .submit(&user, appt.id, 5, Some("Great cut".into()))
            .await
            .unwrap();
        assert_eq!(review.rating, 5);
        assert_eq!(review.barber_name, "Jane Doe");
        assert!(!gate.can_review(&completed).await.unwrap());

        let err = gate.submit(&user, appt.id, 3, None).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotEligible(_)));
        assert_eq!(
            gate.reviewed_appointment_ids(&user).await.unwrap(),
            HashSet::from([appt.id])
        );
    }

    async fn completed_for(
        manager: &crate::lifecycle::AppointmentManager<SqliteStore>,
        user: &Actor,
    ) -> Appointment {
        let admin = Actor::privileged(Uuid::new_v4());
        let appt = manager.create(user, form("2026-10-17")).await.unwrap();
        manager
            .transition_status(&admin, appt.id, "completed")
            .await
            .unwrap()
            .appointment
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submits_store_one_review() {
        for _ in 0..20 {
            let (manager, _rx) = manager();
            let gate = gate_for(manager.store());
            let user = Actor::standard(Uuid::new_v4());
            let appt = completed_for(&manager, &user).await;

            let (first, second) = tokio::join!(
                gate.submit(&user, appt.id, 5, None),
                gate.submit(&user, appt.id, 4, None)
            );

            let outcomes = [first, second];
            assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(outcomes
                .iter()
                .any(|r| matches!(r, Err(LifecycleError::NotEligible(_)))));

            let stored = manager
                .store()
                .query_reviews(ReviewFilter {
                    appointment_id: Some(appt.id),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(stored.len(), 1);
        }
    }

    /// Serves every review query as empty, the way a read taken just before
    /// another session's insert would look.
    struct StaleReviews(SqliteStore);

    impl RecordStore for StaleReviews {
        async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
            self.0.insert_appointment(appointment).await
        }

        async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
            self.0.get_appointment(id).await
        }

        async fn update_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
            self.0.update_appointment(appointment).await
        }

        async fn delete_appointment(&self, id: Uuid) -> Result<(), StoreError> {
            self.0.delete_appointment(id).await
        }

        async fn query_appointments(
            &self,
            filter: AppointmentFilter,
            order: AppointmentOrder,
        ) -> Result<Vec<Appointment>, StoreError> {
            self.0.query_appointments(filter, order).await
        }

        async fn insert_review(&self, review: Review) -> Result<Review, StoreError> {
            self.0.insert_review(review).await
        }

        async fn query_reviews(&self, _filter: ReviewFilter) -> Result<Vec<Review>, StoreError> {
            Ok(Vec::new())
        }

        async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
            self.0.get_profile(id).await
        }

        async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
            self.0.list_profiles().await
        }
    }

    #[tokio::test]
    async fn unique_constraint_rejects_second_review_after_stale_check() {
        let (manager, _rx) = manager();
        let user = Actor::standard(Uuid::new_v4());
        let appt = completed_for(&manager, &user).await;

        let inner = manager.store().as_ref().clone();
        let gate = ReviewGate::new(
            Arc::new(StaleReviews(inner.clone())),
            Arc::new(FixedClock(fixed_now())),
        );

        gate.submit(&user, appt.id, 5, None).await.unwrap();
        assert!(gate.can_review(&appt).await.unwrap());

        let err = gate.submit(&user, appt.id, 4, None).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotEligible(_)));

        let stored = inner.query_reviews(ReviewFilter::default()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, 5);
    }

    #[tokio::test]
    async fn submit_before_completion_not_eligible() {
        let (manager, _rx) = manager();
        let gate = gate_for(manager.store());
        let user = Actor::standard(Uuid::new_v4());
        let appt = manager.create(&user, form("2026-10-17")).await.unwrap();

        let err = gate.submit(&user, appt.id, 4, None).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotEligible(_)));
    }

    #[tokio::test]
    async fn validation_runs_before_lookup() {
        let (manager, _rx) = manager();
        let gate = gate_for(manager.store());
        let err = gate
            .submit(&Actor::standard(Uuid::new_v4()), Uuid::new_v4(), 9, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let err = gate
            .submit(&Actor::standard(Uuid::new_v4()), Uuid::new_v4(), 4, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn only_owner_may_review() {
        let (manager, _rx) = manager();
        let gate = gate_for(manager.store());
        let user = Actor::standard(Uuid::new_v4());
        let admin = Actor::privileged(Uuid::new_v4());
        let appt = manager.create(&user, form("2026-10-17")).await.unwrap();
        manager
            .transition_status(&admin, appt.id, "completed")
            .await
            .unwrap();

        for other in [admin, Actor::standard(Uuid::new_v4())] {
            let err = gate.submit(&other, appt.id, 5, None).await.unwrap_err();
            assert!(matches!(err, LifecycleError::NotAuthorized));
        }
    }

    #[tokio::test]
    async fn walk_in_cannot_be_reviewed() {
        let (manager, _rx) = manager();
        let gate = gate_for(manager.store());
        let admin = Actor::privileged(Uuid::new_v4());
        let appt = manager.create(&admin, form("2026-10-17")).await.unwrap();
        let completed = manager
            .transition_status(&admin, appt.id, "completed")
            .await
            .unwrap()
            .appointment;
        assert!(!gate.can_review(&completed).await.unwrap());
    }

    #[tokio::test]
    async fn public_listing_filters_by_service() {
        let (manager, _rx) = manager();
        let gate = gate_for(manager.store());
        let admin = Actor::privileged(Uuid::new_v4());
        let user = Actor::standard(Uuid::new_v4());

        let mut beard = form("2026-10-17");
        beard.service_type = "Beard Trim".into();
        for input in [form("2026-10-17"), beard] {
            let appt = manager.create(&user, input).await.unwrap();
            manager
                .transition_status(&admin, appt.id, "completed")
                .await
                .unwrap();
            gate.submit(&user, appt.id, 4, None).await.unwrap();
        }

        assert_eq!(gate.list_public(ReviewFilter::default()).await.unwrap().len(), 2);
        let beard_only = gate
            .list_public(ReviewFilter {
                service_type: Some(ServiceType::BeardTrim),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(beard_only.len(), 1);
    }
}
