//! Customer dashboard endpoint.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::DashboardSnapshot;
use crate::roles::Actor;

/// `GET /api/dashboard`: the actor's appointments with review flags.
pub async fn snapshot(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let mut dashboard = ctx.core.dashboard(actor);
    dashboard.refresh().await?;
    Ok(Json(dashboard.snapshot()))
}
