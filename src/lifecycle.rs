//! Appointment lifecycle manager.
//!
//! Validates and applies every write to an appointment, enforces ownership,
//! and queues a notification after a committed status change. The status
//! machine is fully connected: any of the four states may follow any other.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use uuid::Uuid;

use crate::models::*;
use crate::outbox::NotificationOutbox;
use crate::roles::Actor;
use crate::store::{RecordStore, StoreError};
use crate::visibility::{self, AppointmentQuery, RosterEntry};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const NOTES_MAX_CHARS: usize = 500;

// ═══════════════════════════════════════════════════════════
// Clock
// ═══════════════════════════════════════════════════════════

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Shop-local wall clock, truncated to whole seconds.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// A clock that never moves.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// First violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Not authorized")]
    NotAuthorized,
    #[error("Not eligible: {0}")]
    NotEligible(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => LifecycleError::NotFound { entity, id },
            other => LifecycleError::Store(other),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Field validation
// ═══════════════════════════════════════════════════════════

pub fn validate_full_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(ValidationError::new(
            "full_name",
            "Full name must be at least 2 characters",
        ));
    }
    if len > NAME_MAX_CHARS {
        return Err(ValidationError::new(
            "full_name",
            "Full name must be at most 100 characters",
        ));
    }
    Ok(name.to_string())
}

pub fn parse_service_type(raw: &str) -> Result<ServiceType, ValidationError> {
    ServiceType::from_str(raw.trim())
        .map_err(|_| ValidationError::new("service_type", "Please select a service type"))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date", "Date must be in YYYY-MM-DD format"))
}

fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if date < today {
        return Err(ValidationError::new("date", "Date cannot be in the past"));
    }
    Ok(date)
}

pub fn validate_time(raw: &str) -> Result<String, ValidationError> {
    let time = raw.trim();
    if !TIME_SLOTS.contains(&time) {
        return Err(ValidationError::new("time", "Please select a time"));
    }
    Ok(time.to_string())
}

/// Empty or whitespace-only notes become `None`.
pub fn normalize_notes(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(notes) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if notes.chars().count() > NOTES_MAX_CHARS {
        return Err(ValidationError::new(
            "notes",
            "Notes must be less than 500 characters",
        ));
    }
    Ok(Some(notes.to_string()))
}

pub fn parse_status(raw: &str) -> Result<AppointmentStatus, LifecycleError> {
    AppointmentStatus::from_str(raw).map_err(|_| LifecycleError::InvalidStatus(raw.to_string()))
}

// ═══════════════════════════════════════════════════════════
// Manager
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub appointment: Appointment,
    pub status_changed: bool,
}

pub struct AppointmentManager<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    outbox: NotificationOutbox,
}

impl<S> Clone for AppointmentManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            outbox: self.outbox.clone(),
        }
    }
}

impl<S: RecordStore> AppointmentManager<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, outbox: NotificationOutbox) -> Self {
        Self {
            store,
            clock,
            outbox,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Book a new appointment in `pending`.
    ///
    /// Standard actors always book for themselves. Privileged actors book
    /// for `form.owner_id`, or a walk-in when it is absent.
    pub async fn create(
        &self,
        actor: &Actor,
        form: AppointmentForm,
    ) -> Result<Appointment, LifecycleError> {
        let today = self.clock.today();
        let full_name = validate_full_name(&form.full_name)?;
        let service_type = parse_service_type(&form.service_type)?;
        let date = ensure_not_past(parse_date(&form.date)?, today)?;
        let time = validate_time(&form.time)?;
        let notes = normalize_notes(form.notes.as_deref())?;

        let owner_id = if actor.is_privileged() {
            form.owner_id
        } else {
            Some(actor.id)
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            owner_id,
            full_name,
            service_type,
            date,
            time,
            status: AppointmentStatus::Pending,
            notes,
            created_at: self.clock.now(),
        };

        let created = self.store.insert_appointment(appointment).await?;
        tracing::info!(
            appointment_id = %created.id,
            actor_id = %actor.id,
            walk_in = created.owner_id.is_none(),
            "Appointment created"
        );
        Ok(created)
    }

    /// Apply `patch`, validating only the fields it carries.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<UpdateOutcome, LifecycleError> {
        let current = self.load_mutable(actor, id).await?;
        let mut next = current.clone();

        if let Some(raw) = &patch.full_name {
            next.full_name = validate_full_name(raw)?;
        }
        if let Some(raw) = &patch.service_type {
            next.service_type = parse_service_type(raw)?;
        }
        if let Some(raw) = &patch.date {
            let date = parse_date(raw)?;
            if date != current.date {
                next.date = ensure_not_past(date, self.clock.today())?;
            }
        }
        if let Some(raw) = &patch.time {
            next.time = validate_time(raw)?;
        }
        if let Some(raw) = &patch.status {
            next.status = parse_status(raw)?;
        }
        if patch.notes.is_some() {
            next.notes = normalize_notes(patch.notes.as_deref())?;
        }

        let status_changed = next.status != current.status;
        self.store.update_appointment(next.clone()).await?;

        tracing::info!(
            appointment_id = %id,
            actor_id = %actor.id,
            status = %next.status,
            status_changed,
            "Appointment updated"
        );

        if status_changed {
            self.outbox
                .enqueue(next.clone(), MessageKind::for_status(next.status));
        }

        Ok(UpdateOutcome {
            appointment: next,
            status_changed,
        })
    }

    /// Move to `new_status`. Unknown values are rejected before any read.
    pub async fn transition_status(
        &self,
        actor: &Actor,
        id: Uuid,
        new_status: &str,
    ) -> Result<UpdateOutcome, LifecycleError> {
        let status = parse_status(new_status)?;
        self.update(actor, id, AppointmentPatch::status(status.as_str()))
            .await
    }

    /// Hard delete. Reviews of the appointment go with it.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), LifecycleError> {
        self.load_mutable(actor, id).await?;
        self.store.delete_appointment(id).await?;
        tracing::info!(appointment_id = %id, actor_id = %actor.id, "Appointment deleted");
        Ok(())
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Appointment, LifecycleError> {
        self.load_mutable(actor, id).await
    }

    /// Appointments visible to `actor`, earliest first.
    pub async fn list(
        &self,
        actor: &Actor,
        query: &AppointmentQuery,
    ) -> Result<Vec<Appointment>, LifecycleError> {
        let filter = AppointmentFilter {
            owner_id: (!actor.is_privileged()).then_some(actor.id),
            status: query.status,
            ..Default::default()
        };
        let records = self
            .store
            .query_appointments(filter, AppointmentOrder::Chronological)
            .await?;
        let visible = visibility::visible_appointments(actor, records);

        let searching = query.search.as_deref().is_some_and(|s| !s.trim().is_empty());
        let profiles = if searching && actor.is_privileged() {
            self.store.list_profiles().await?
        } else {
            Vec::new()
        };
        Ok(visibility::search(visible, query, &profiles))
    }

    /// Per-owner status counts. Privileged only.
    pub async fn roster(&self, actor: &Actor) -> Result<Vec<RosterEntry>, LifecycleError> {
        if !visibility::can_administer(actor) {
            return Err(LifecycleError::NotAuthorized);
        }
        let records = self
            .store
            .query_appointments(AppointmentFilter::default(), AppointmentOrder::RecentlyCreated)
            .await?;
        let profiles = self.store.list_profiles().await?;
        visibility::owner_roster(actor, &records, &profiles).ok_or(LifecycleError::NotAuthorized)
    }

    /// Queue a reminder for every confirmed appointment on `date`.
    pub async fn send_reminders(
        &self,
        actor: &Actor,
        date: NaiveDate,
    ) -> Result<usize, LifecycleError> {
        if !visibility::can_administer(actor) {
            return Err(LifecycleError::NotAuthorized);
        }
        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Confirmed),
            date_from: Some(date),
            date_to: Some(date),
            ..Default::default()
        };
        let due = self
            .store
            .query_appointments(filter, AppointmentOrder::Chronological)
            .await?;

        let count = due.len();
        for appointment in due {
            self.outbox.enqueue(appointment, MessageKind::Reminder);
        }
        tracing::info!(date = %date, count, "Reminders queued");
        Ok(count)
    }

    /// Earliest own pending or confirmed appointment from today on.
    pub async fn next_appointment(&self, actor: &Actor) -> Result<Option<Appointment>, LifecycleError> {
        let filter = AppointmentFilter {
            owner_id: Some(actor.id),
            date_from: Some(self.clock.today()),
            ..Default::default()
        };
        let upcoming = self
            .store
            .query_appointments(filter, AppointmentOrder::Chronological)
            .await?;
        Ok(upcoming.into_iter().find(|a| {
            matches!(
                a.status,
                AppointmentStatus::Pending | AppointmentStatus::Confirmed
            )
        }))
    }

    async fn load_mutable(&self, actor: &Actor, id: Uuid) -> Result<Appointment, LifecycleError> {
        let appointment = self
            .store
            .get_appointment(id)
            .await?
            .ok_or(LifecycleError::NotFound {
                entity: "Appointment",
                id,
            })?;
        if !visibility::can_mutate(actor, &appointment) {
            tracing::warn!(appointment_id = %id, actor_id = %actor.id, "Appointment access denied");
            return Err(LifecycleError::NotAuthorized);
        }
        Ok(appointment)
    }
}
