use chrono::NaiveDate;
use uuid::Uuid;

use super::enums::{AppointmentStatus, ServiceType};

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppointmentOrder {
    /// Date then time, earliest first.
    #[default]
    Chronological,
    /// Newest booking first.
    RecentlyCreated,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub appointment_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub service_type: Option<ServiceType>,
    pub barber_name: Option<String>,
}
