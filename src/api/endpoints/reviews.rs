//! Review endpoints.
//!
//! - `GET  /api/reviews`: public listing with rating summary
//! - `POST /api/reviews`: submit a review for a completed appointment

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{json_body, query_params, ApiContext};
use crate::models::{Review, ReviewFilter, ServiceType};
use crate::review::{self, ReviewSummary};
use crate::roles::Actor;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub barber: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub summary: ReviewSummary,
    pub reviews: Vec<Review>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<ReviewListQuery>, QueryRejection>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let query = query_params(query)?;
    let filter = ReviewFilter {
        service_type: query.service_type,
        barber_name: query.barber.filter(|b| !b.trim().is_empty()),
        ..Default::default()
    };
    let reviews = ctx.core.gate().list_public(filter).await?;
    Ok(Json(ReviewsResponse {
        summary: review::summary(&reviews),
        reviews,
    }))
}

#[derive(Deserialize)]
pub struct SubmitReviewRequest {
    pub appointment_id: Uuid,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    body: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let request = json_body(body)?;
    let review = ctx
        .core
        .gate()
        .submit(&actor, request.appointment_id, request.rating, request.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
