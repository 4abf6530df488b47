//! New-message notifications
//!
//! Delivery is best effort: the hook runs after the message is committed, in
//! its own task, and a failure is logged and counted but never reaches the
//! sender.

use crate::error::{AppError, AppResult};
use crate::metrics;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Notification categories understood by the notification subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Message,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::Message => write!(f, "MESSAGE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

impl Notification {
    /// Notification for the receiver of a freshly sent message
    pub fn new_message(
        recipient_id: Uuid,
        sender_name: Option<&str>,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> Self {
        let sender_name = sender_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Someone");
        Self {
            user_id: recipient_id,
            kind: NotificationType::Message,
            title: "New Message".to_string(),
            message: format!("{sender_name} sent you a message"),
            data: serde_json::json!({
                "conversationId": conversation_id,
                "messageId": message_id,
            }),
        }
    }
}

#[async_trait::async_trait]
pub trait NotificationHook: Send + Sync {
    async fn notify(&self, notification: &Notification) -> AppResult<()>;
}

/// Writes into the shared `notifications` table
#[derive(Clone)]
pub struct PgNotificationHook {
    pool: PgPool,
}

impl PgNotificationHook {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationHook for PgNotificationHook {
    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, type, title, message, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind.to_string())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Emits notifications as log events; used when no database is configured
#[derive(Debug, Clone, Default)]
pub struct LoggingNotificationHook;

#[async_trait::async_trait]
impl NotificationHook for LoggingNotificationHook {
    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            title = %notification.title,
            message = %notification.message,
            "notification emitted"
        );
        Ok(())
    }
}

/// Run the hook on a detached task and swallow the outcome
pub fn dispatch<F>(hook: Arc<dyn NotificationHook>, build: F)
where
    F: std::future::Future<Output = AppResult<Notification>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = match build.await {
            Ok(notification) => hook.notify(&notification).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            report_failure(&e);
        }
    });
}

fn report_failure(err: &AppError) {
    metrics::NOTIFICATION_FAILURES_TOTAL.inc();
    tracing::warn!(error = %err, "failed to deliver message notification");
}
