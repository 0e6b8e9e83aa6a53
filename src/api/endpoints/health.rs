//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
    })
}
