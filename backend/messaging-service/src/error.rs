use crate::middleware::error_handling;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("You must be logged in")]
    Unauthenticated,

    /// Self-conversation, unknown target user or malformed target id
    #[error("{0}")]
    InvalidTarget(String),

    #[error("Message cannot be empty")]
    EmptyContent,

    #[error("Message cannot exceed {max} characters")]
    ContentTooLong { max: usize },

    #[error("You are not a participant in this conversation")]
    NotAParticipant,

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StoreUnavailable(e.to_string())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl AppError {
    /// Returns whether this error is retryable (e.g., database connection timeout)
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_) | AppError::Internal)
    }

    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_)
            | AppError::InvalidTarget(_)
            | AppError::EmptyContent
            | AppError::ContentTooLong { .. } => 400,
            AppError::Unauthenticated => 401,
            AppError::NotAParticipant => 403,
            AppError::ConversationNotFound => 404,
            AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Database(_)
            | AppError::StoreUnavailable(_)
            | AppError::Internal => 500,
        }
    }
}
