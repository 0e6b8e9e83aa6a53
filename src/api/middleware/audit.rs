//! Access logging middleware.
//!
//! Logs every API request with method, path, actor and response status.
//! Runs innermost, after auth has injected the actor.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::MaybeActor;
use crate::roles::Actor;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let actor = req
        .extensions()
        .get::<Actor>()
        .copied()
        .or_else(|| req.extensions().get::<MaybeActor>().and_then(|m| m.0));
    let started = Instant::now();

    let response = next.run(req).await;

    let actor_id = actor.map(|a| a.id.to_string());
    tracing::info!(
        %method,
        path,
        actor_id = actor_id.as_deref().unwrap_or("anonymous"),
        privileged = actor.is_some_and(|a| a.is_privileged()),
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
