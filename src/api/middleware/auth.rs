//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it against the
//! sessions written by the hosted auth service, resolves the actor's role
//! and injects the result into request extensions.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MaybeActor};
use crate::roles::Actor;

/// Require a valid session. Injects `Actor`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    let actor = ctx
        .core
        .authenticate(&token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(actor);

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Resolve a session when one is presented. Injects `MaybeActor`.
///
/// Unknown or expired tokens fall back to anonymous access.
pub async fn optional_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match optional_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn optional_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let actor: Option<Actor> = match bearer_token(&req) {
        Some(token) => {
            let actor = ctx.core.authenticate(&token).await?;
            if actor.is_none() {
                tracing::debug!("Unknown bearer token on public route, continuing anonymously");
            }
            actor
        }
        None => None,
    };

    req.extensions_mut().insert(MaybeActor(actor));
    Ok(next.run(req).await)
}

fn context(req: &Request<axum::body::Body>) -> Result<ApiContext, ApiError> {
    req.extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))
}

fn bearer_token(req: &Request<axum::body::Body>) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
