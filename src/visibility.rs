//! Visibility / role filter.
//!
//! Pure functions over already-fetched records. Default-deny: anything that
//! is not the actor's own record needs `Capability::Privileged`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, Profile};
use crate::roles::Actor;

// ═══════════════════════════════════════════════════════════
// Record filtering
// ═══════════════════════════════════════════════════════════

/// The subset of `records` the actor may see.
pub fn visible_appointments(actor: &Actor, records: Vec<Appointment>) -> Vec<Appointment> {
    if actor.is_privileged() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| record.is_owned_by(&actor.id))
        .collect()
}

/// Owner or privileged.
pub fn can_mutate(actor: &Actor, record: &Appointment) -> bool {
    actor.is_privileged() || record.is_owned_by(&actor.id)
}

/// Bulk and administrative operations.
pub fn can_administer(actor: &Actor) -> bool {
    actor.is_privileged()
}

// ═══════════════════════════════════════════════════════════
// Admin search
// ═══════════════════════════════════════════════════════════

/// Listing filters shared by the customer list and the admin search box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    /// Status tab; `None` shows all.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    /// Case-insensitive substring of the appointment name or owner email.
    #[serde(default)]
    pub search: Option<String>,
}

/// Apply `query` to `records`, keeping their order.
pub fn search(
    records: Vec<Appointment>,
    query: &AppointmentQuery,
    profiles: &[Profile],
) -> Vec<Appointment> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let emails: HashMap<Uuid, String> = profiles
        .iter()
        .filter_map(|p| p.email.as_ref().map(|e| (p.id, e.to_lowercase())))
        .collect();

    records
        .into_iter()
        .filter(|record| query.status.map_or(true, |status| record.status == status))
        .filter(|record| match &needle {
            None => true,
            Some(needle) => {
                record.full_name.to_lowercase().contains(needle.as_str())
                    || record
                        .owner_id
                        .and_then(|owner| emails.get(&owner))
                        .is_some_and(|email| email.contains(needle.as_str()))
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Roster aggregation
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub canceled: usize,
}

impl StatusCounts {
    fn add(&mut self, status: AppointmentStatus) {
        self.total += 1;
        match status {
            AppointmentStatus::Pending => self.pending += 1,
            AppointmentStatus::Confirmed => self.confirmed += 1,
            AppointmentStatus::Completed => self.completed += 1,
            AppointmentStatus::Canceled => self.canceled += 1,
        }
    }
}

/// One roster row. `owner_id == None` groups walk-in bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub owner_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub counts: StatusCounts,
}

/// Per-owner status counts for the admin roster.
///
/// Every known profile appears, including those with no bookings, in
/// profile order. Owners with bookings but no profile follow, then the
/// walk-in group if any walk-ins exist. Returns `None` for non-privileged
/// actors.
pub fn owner_roster(
    actor: &Actor,
    records: &[Appointment],
    profiles: &[Profile],
) -> Option<Vec<RosterEntry>> {
    if !can_administer(actor) {
        return None;
    }

    let mut counts: HashMap<Option<Uuid>, StatusCounts> = HashMap::new();
    let mut first_seen: Vec<Option<Uuid>> = Vec::new();
    for record in records {
        counts
            .entry(record.owner_id)
            .or_insert_with(|| {
                first_seen.push(record.owner_id);
                StatusCounts::default()
            })
            .add(record.status);
    }

    let mut roster: Vec<RosterEntry> = profiles
        .iter()
        .map(|profile| RosterEntry {
            owner_id: Some(profile.id),
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            counts: counts.remove(&Some(profile.id)).unwrap_or_default(),
        })
        .collect();

    let mut walk_ins = None;
    for owner in first_seen {
        let Some(owner_counts) = counts.remove(&owner) else {
            continue;
        };
        let entry = RosterEntry {
            owner_id: owner,
            full_name: None,
            email: None,
            counts: owner_counts,
        };
        if owner.is_none() {
            walk_ins = Some(entry);
        } else {
            roster.push(entry);
        }
    }
    roster.extend(walk_ins);

    Some(roster)
}
