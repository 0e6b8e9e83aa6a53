//! Chat assistant endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{json_body, ApiContext, MaybeActor};
use crate::chat::{self, ChatIntent, ChatReply, Language};
use crate::store::RecordStore;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// `POST /api/chat`: an empty message returns the welcome greeting.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(MaybeActor(actor)): Extension<MaybeActor>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let request = json_body(body)?;

    if request.message.trim().is_empty() {
        let email = match &actor {
            Some(actor) => ctx
                .core
                .store()
                .get_profile(actor.id)
                .await?
                .and_then(|p| p.email),
            None => None,
        };
        return Ok(Json(ChatReply {
            intent: ChatIntent::Welcome,
            language: Language::English,
            text: chat::welcome_message(email.as_deref()),
        }));
    }

    let reply = chat::respond(ctx.core.manager(), actor.as_ref(), &request.message).await?;
    Ok(Json(reply))
}
