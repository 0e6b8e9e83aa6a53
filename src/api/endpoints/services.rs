//! Service catalogue endpoint.

use axum::Json;

use crate::catalog::{self, Catalog};

/// `GET /api/services`: services, prices, hours and location.
pub async fn list() -> Json<Catalog> {
    Json(catalog::catalog())
}
