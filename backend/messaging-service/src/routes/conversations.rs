use crate::{error::AppError, middleware::guards::Caller, routes::poll_response, state::AppState};
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// The other participant
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    pub conversation_id: Uuid,
}

/// GET /conversations
/// The caller's conversations, most recently active first
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let conversations = state.conversations.list_conversations(caller.id()).await?;
    Ok(poll_response(state.config.conversation_poll_interval_ms).json(conversations))
}

/// POST /conversations
/// Get or create the direct conversation with `userId`
#[post("/conversations")]
pub async fn create_conversation(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = caller.id().ok_or(AppError::Unauthenticated)?;

    let raw = body
        .into_inner()
        .user_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("User ID is required".into()))?;
    let other_user_id = Uuid::parse_str(&raw)
        .map_err(|_| AppError::InvalidTarget("Invalid user ID".into()))?;

    let conversation_id = state
        .conversations
        .get_or_create_conversation(Some(caller), other_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(CreateConversationResponse { conversation_id }))
}
