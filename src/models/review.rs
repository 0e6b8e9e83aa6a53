use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ServiceType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub owner_id: Uuid,
    /// Name shown on the public listing, copied from the appointment.
    pub barber_name: String,
    pub service_type: ServiceType,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}
