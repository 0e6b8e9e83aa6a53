use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, ServiceType};

/// Hourly booking slots offered by the shop.
pub const TIME_SLOTS: &[&str] = &[
    "06:00", "07:00", "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00",
    "16:00", "17:00", "18:00", "19:00", "20:00",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// `None` for walk-ins entered by staff.
    pub owner_id: Option<Uuid>,
    pub full_name: String,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    pub fn is_owned_by(&self, actor_id: &Uuid) -> bool {
        self.owner_id.as_ref() == Some(actor_id)
    }
}

/// Raw booking input as submitted by a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentForm {
    pub full_name: String,
    pub service_type: String,
    pub date: String, // YYYY-MM-DD
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Privileged surface only: book on behalf of another user.
    /// Ignored for standard actors.
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// `Some("")` clears the notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl AppointmentPatch {
    pub fn status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    /// A patch that restates every editable field of `appointment`.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            full_name: Some(appointment.full_name.clone()),
            service_type: Some(appointment.service_type.as_str().to_string()),
            date: Some(appointment.date.format("%Y-%m-%d").to_string()),
            time: Some(appointment.time.clone()),
            status: Some(appointment.status.as_str().to_string()),
            notes: Some(appointment.notes.clone().unwrap_or_default()),
        }
    }
}
