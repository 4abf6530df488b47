use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};

/// Map domain errors to HTTP status and the shared error body.
///
/// Server-side failures never leak their details to the client.
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match err {
        AppError::BadRequest(msg) => {
            ErrorResponse::new(msg.clone()).with_code(error_codes::INVALID_REQUEST)
        }
        AppError::Unauthenticated => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::UNAUTHENTICATED)
        }
        AppError::InvalidTarget(_) => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::INVALID_TARGET)
        }
        AppError::EmptyContent => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::EMPTY_CONTENT)
        }
        AppError::ContentTooLong { .. } => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::CONTENT_TOO_LONG)
        }
        AppError::NotAParticipant => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::NOT_CONVERSATION_MEMBER)
        }
        AppError::ConversationNotFound => {
            ErrorResponse::new(err.to_string()).with_code(error_codes::CONVERSATION_NOT_FOUND)
        }
        AppError::Database(_) | AppError::StoreUnavailable(_) => {
            ErrorResponse::new("Internal server error").with_code(error_codes::STORE_UNAVAILABLE)
        }
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal => {
            ErrorResponse::new("Internal server error")
                .with_code(error_codes::INTERNAL_SERVER_ERROR)
        }
    };

    (status, body)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, body) = map_error(err);
    if status.is_server_error() {
        tracing::error!(error = %err, retryable = err.is_retryable(), "request failed");
    } else {
        tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
    }
    HttpResponse::build(status).json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_body_is_generic() {
        let (status, body) = map_error(&AppError::Database(
            "relation \"messages\" does not exist".into(),
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.code.as_deref(), Some(error_codes::STORE_UNAVAILABLE));
    }

    #[test]
    fn test_invalid_target_keeps_message() {
        let (status, body) =
            map_error(&AppError::InvalidTarget("Cannot message yourself".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Cannot message yourself");
        assert_eq!(body.code.as_deref(), Some(error_codes::INVALID_TARGET));
    }

    #[test]
    fn test_bad_request_passes_message_through() {
        let (status, body) = map_error(&AppError::BadRequest("User ID is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "User ID is required");
    }

    #[test]
    fn test_not_a_participant_is_forbidden() {
        let (status, body) = map_error(&AppError::NotAParticipant);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code.as_deref(), Some(error_codes::NOT_CONVERSATION_MEMBER));
    }
}
