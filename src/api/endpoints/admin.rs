//! Administrative endpoints. Privileged actors only.
//!
//! - `GET  /api/admin/roster`: per-customer status counts
//! - `POST /api/admin/reminders`: queue reminders for a day

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{json_body, ApiContext};
use crate::roles::Actor;
use crate::visibility::RosterEntry;

#[derive(Serialize)]
pub struct RosterResponse {
    pub roster: Vec<RosterEntry>,
}

pub async fn roster(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<RosterResponse>, ApiError> {
    let roster = ctx.core.manager().roster(&actor).await?;
    Ok(Json(RosterResponse { roster }))
}

#[derive(Deserialize)]
pub struct ReminderRequest {
    /// Defaults to tomorrow.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct ReminderResponse {
    pub date: NaiveDate,
    pub queued: usize,
}

pub async fn reminders(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<ReminderRequest>, JsonRejection>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let request = json_body(body)?;
    let manager = ctx.core.manager();
    let date = match request.date {
        Some(date) => date,
        None => manager
            .clock()
            .today()
            .succ_opt()
            .ok_or_else(|| ApiError::BadRequest("date out of range".into()))?,
    };
    let queued = manager.send_reminders(&actor, date).await?;
    Ok(Json(ReminderResponse { date, queued }))
}
