//! HTTP API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! CORS → Extension(ApiContext) → Auth (required or optional) → Access log

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers apply bottom-up: the Extension layer is outermost so the auth
    // middleware can read ApiContext.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail)
                .patch(endpoints::appointments::update)
                .delete(endpoints::appointments::remove),
        )
        .route(
            "/appointments/:id/status",
            post(endpoints::appointments::transition),
        )
        .route(
            "/appointments/:id/review-eligibility",
            get(endpoints::appointments::review_eligibility),
        )
        .route("/reviews", post(endpoints::reviews::submit))
        .route("/dashboard", get(endpoints::dashboard::snapshot))
        .route("/admin/roster", get(endpoints::admin::roster))
        .route("/admin/reminders", post(endpoints::admin::reminders))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Public routes: a session is used when presented but not required.
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/services", get(endpoints::services::list))
        .route("/reviews", get(endpoints::reviews::list))
        .route("/chat", post(endpoints::chat::send))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::optional_auth))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(cors_layer())
}

/// Same allowances as the hosted email function.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
