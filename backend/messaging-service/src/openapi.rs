//! OpenAPI documentation for the AfriFound messaging service

use crate::models::{ConversationSummary, Message, MessagePage, UserSummary};
use crate::routes::conversations::{CreateConversationRequest, CreateConversationResponse};
use crate::routes::messages::SendMessageRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AfriFound Messaging Service API",
        version = "0.1.0",
        description = "Direct conversations between founders and investors, polled by the dashboard",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8085", description = "Development server"),
    ),
    components(schemas(
        Message,
        MessagePage,
        ConversationSummary,
        UserSummary,
        CreateConversationRequest,
        CreateConversationResponse,
        SendMessageRequest,
    )),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Conversations", description = "Conversation list and get-or-create"),
        (name = "Messages", description = "Message pages and sending"),
    )
)]
pub struct ApiDoc;
