//! Per-actor dashboard state.
//!
//! Holds the last fetched appointment list and the set of reviewed
//! appointments. Every mutation goes through the manager or the review gate
//! and is followed by a full re-fetch; the cached list is never patched in
//! place.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::lifecycle::{AppointmentManager, LifecycleError, UpdateOutcome};
use crate::models::*;
use crate::review::ReviewGate;
use crate::roles::Actor;
use crate::store::RecordStore;
use crate::visibility::AppointmentQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    pub appointment: Appointment,
    pub reviewed: bool,
    pub can_review: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub appointments: Vec<DashboardRow>,
}

pub struct DashboardState<S> {
    actor: Actor,
    manager: AppointmentManager<S>,
    gate: ReviewGate<S>,
    appointments: Vec<Appointment>,
    reviewed: HashSet<Uuid>,
}

impl<S: RecordStore> DashboardState<S> {
    pub fn new(actor: Actor, manager: AppointmentManager<S>, gate: ReviewGate<S>) -> Self {
        Self {
            actor,
            manager,
            gate,
            appointments: Vec::new(),
            reviewed: HashSet::new(),
        }
    }

    /// Re-fetch everything. Safe to call any number of times.
    pub async fn refresh(&mut self) -> Result<(), LifecycleError> {
        let appointments = self
            .manager
            .list(&self.actor, &AppointmentQuery::default())
            .await?;
        let reviewed = self.gate.reviewed_appointment_ids(&self.actor).await?;
        self.appointments = appointments;
        self.reviewed = reviewed;
        Ok(())
    }

    pub async fn book(&mut self, form: AppointmentForm) -> Result<Appointment, LifecycleError> {
        let created = self.manager.create(&self.actor, form).await?;
        self.refresh().await?;
        Ok(created)
    }

    pub async fn edit(
        &mut self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<UpdateOutcome, LifecycleError> {
        let outcome = self.manager.update(&self.actor, id, patch).await?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub async fn cancel(&mut self, id: Uuid) -> Result<UpdateOutcome, LifecycleError> {
        let outcome = self
            .manager
            .transition_status(&self.actor, id, AppointmentStatus::Canceled.as_str())
            .await?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub async fn remove(&mut self, id: Uuid) -> Result<(), LifecycleError> {
        self.manager.delete(&self.actor, id).await?;
        self.refresh().await
    }

    pub async fn review(
        &mut self,
        id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, LifecycleError> {
        let review = self.gate.submit(&self.actor, id, rating, comment).await?;
        self.refresh().await?;
        Ok(review)
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Rows as last fetched. `can_review` is a display hint; `review`
    /// re-checks eligibility against the store.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let appointments = self
            .appointments
            .iter()
            .map(|appointment| {
                let reviewed = self.reviewed.contains(&appointment.id);
                DashboardRow {
                    can_review: appointment.status == AppointmentStatus::Completed
                        && appointment.is_owned_by(&self.actor.id)
                        && !reviewed,
                    reviewed,
                    appointment: appointment.clone(),
                }
            })
            .collect();
        DashboardSnapshot { appointments }
    }
}
