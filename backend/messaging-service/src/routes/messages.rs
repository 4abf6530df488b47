use crate::{error::AppError, middleware::guards::Caller, routes::poll_response, state::AppState};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    pub conversation_id: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub content: Option<String>,
}

fn parse_conversation_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Conversation ID is required".into()))?;
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid conversation ID".into()))
}

/// GET /messages?conversationId=...&page=...&pageSize=...
/// One page of messages, oldest first; marks the caller's received messages read
#[get("/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<MessageListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let conversation_id = parse_conversation_id(query.conversation_id.as_deref())?;

    let page = state
        .messages
        .get_messages(caller.id(), conversation_id, query.page, query.page_size)
        .await?;

    Ok(poll_response(state.config.message_poll_interval_ms).json(page))
}

/// POST /messages
/// Send a message to the other participant of a conversation
#[post("/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = caller.id().ok_or(AppError::Unauthenticated)?;
    let body = body.into_inner();
    let conversation_id = parse_conversation_id(body.conversation_id.as_deref())?;

    let message = state
        .messages
        .send_message(
            Some(caller),
            conversation_id,
            body.content.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(message))
}
