//! Appointment endpoints.
//!
//! - `GET    /api/appointments`: visible appointments, optional `status` / `search`
//! - `POST   /api/appointments`: book
//! - `GET    /api/appointments/:id`
//! - `PATCH  /api/appointments/:id`: partial update
//! - `DELETE /api/appointments/:id`
//! - `POST   /api/appointments/:id/status`: status transition
//! - `GET    /api/appointments/:id/review-eligibility`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{json_body, parse_id, query_params, ApiContext};
use crate::lifecycle::UpdateOutcome;
use crate::models::{Appointment, AppointmentForm, AppointmentPatch};
use crate::roles::Actor;
use crate::visibility::AppointmentQuery;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    query: Result<Query<AppointmentQuery>, QueryRejection>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let query = query_params(query)?;
    let appointments = ctx.core.manager().list(&actor, &query).await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<AppointmentForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let form = json_body(body)?;
    let created = ctx.core.manager().create(&actor, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(ctx.core.manager().get(&actor, id).await?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<AppointmentPatch>, JsonRejection>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let id = parse_id(&id)?;
    let patch = json_body(body)?;
    Ok(Json(ctx.core.manager().update(&actor, id, patch).await?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    ctx.core.manager().delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn transition(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let id = parse_id(&id)?;
    let request = json_body(body)?;
    Ok(Json(
        ctx.core
            .manager()
            .transition_status(&actor, id, &request.status)
            .await?,
    ))
}

#[derive(Serialize)]
pub struct EligibilityResponse {
    pub appointment_id: Uuid,
    pub can_review: bool,
}

pub async fn review_eligibility(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let id = parse_id(&id)?;
    let appointment = ctx.core.manager().get(&actor, id).await?;
    let can_review =
        appointment.is_owned_by(&actor.id) && ctx.core.gate().can_review(&appointment).await?;
    Ok(Json(EligibilityResponse {
        appointment_id: id,
        can_review,
    }))
}
