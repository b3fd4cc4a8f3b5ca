use super::{
    types::{AskRequest, AskResponse},
    MISSING_PAYLOAD,
};
use crate::chat::{self, ChatProxy};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};

pub const GUIDE_NOT_FOUND: &str = "Guide file not found.";
pub const SERVER_ERROR: &str = "Server error occurred.";

#[utoipa::path(
    post,
    path= "/api/ask",
    request_body = AskRequest,
    responses (
        (status = 200, description = "Assistant reply", body = AskResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = AskResponse),
        (status = 500, description = "Guide missing or generation API failure", body = AskResponse),
    ),
    tag= "assistant"
)]
#[instrument(skip(chat, payload))]
pub async fn ask(
    chat: Extension<Arc<ChatProxy>>,
    payload: Option<Json<AskRequest>>,
) -> impl IntoResponse {
    let request: AskRequest = match payload {
        Some(Json(payload)) => payload,
        None => return reply(StatusCode::BAD_REQUEST, MISSING_PAYLOAD),
    };

    match chat.ask(&request.user_question).await {
        Ok(answer) => (StatusCode::OK, Json(AskResponse { reply: answer })),
        Err(chat::Error::ResourceMissing(path)) => {
            error!("Guide document missing: {}", path.display());
            reply(StatusCode::INTERNAL_SERVER_ERROR, GUIDE_NOT_FOUND)
        }
        Err(e) => {
            error!("Error answering question: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
        }
    }
}

fn reply(status: StatusCode, text: &str) -> (StatusCode, Json<AskResponse>) {
    (
        status,
        Json(AskResponse {
            reply: text.to_string(),
        }),
    )
}
