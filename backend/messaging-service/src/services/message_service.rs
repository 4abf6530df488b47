use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{Message, MessagePage, NewMessage, PageRequest};
use crate::repository::MessagingRepository;
use crate::services::notification::{self, Notification, NotificationHook};
use crate::services::read_state;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct MessageLimits {
    pub max_length: usize,
    pub page_size_max: u32,
}

#[derive(Clone)]
pub struct MessageService {
    repo: Arc<dyn MessagingRepository>,
    notifier: Arc<dyn NotificationHook>,
    limits: MessageLimits,
}

impl MessageService {
    pub fn new(
        repo: Arc<dyn MessagingRepository>,
        notifier: Arc<dyn NotificationHook>,
        limits: MessageLimits,
    ) -> Self {
        Self {
            repo,
            notifier,
            limits,
        }
    }

    pub fn limits(&self) -> MessageLimits {
        self.limits
    }

    /// Append a message from the caller to the other participant.
    ///
    /// The receiver is notified after the message is stored; notification
    /// failures never fail the send.
    pub async fn send_message(
        &self,
        caller: Option<Uuid>,
        conversation_id: Uuid,
        content: &str,
    ) -> AppResult<Message> {
        let sender_id = caller.ok_or(AppError::Unauthenticated)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::EmptyContent);
        }
        if content.chars().count() > self.limits.max_length {
            return Err(AppError::ContentTooLong {
                max: self.limits.max_length,
            });
        }

        let conversation = self
            .repo
            .get_conversation(conversation_id)
            .await?
            .ok_or(AppError::ConversationNotFound)?;
        let receiver_id = conversation
            .other_participant(sender_id)
            .ok_or(AppError::NotAParticipant)?;

        let users = self.repo.user_summaries(&[sender_id, receiver_id]).await?;
        let sender_name = users.get(&sender_id).and_then(|u| u.name.clone());

        let message = self
            .repo
            .append_message(NewMessage {
                id: Uuid::new_v4(),
                conversation_id,
                sender_id,
                receiver_id,
                content: content.to_string(),
                created_at: Utc::now(),
            })
            .await?
            .with_profiles(&users);

        metrics::MESSAGES_SENT_TOTAL.inc();
        tracing::debug!(
            conversation_id = %conversation_id,
            message_id = %message.id,
            user_id = %sender_id,
            "message sent"
        );

        let message_id = message.id;
        notification::dispatch(self.notifier.clone(), async move {
            Ok(Notification::new_message(
                receiver_id,
                sender_name.as_deref(),
                conversation_id,
                message_id,
            ))
        });

        Ok(message)
    }

    /// One page of the conversation, oldest first; marks the caller's received
    /// messages in the conversation as read.
    ///
    /// Anonymous callers, non-participants and unknown conversations all get
    /// an empty page. Items carry their read flags from before the marking.
    pub async fn get_messages(
        &self,
        caller: Option<Uuid>,
        conversation_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> AppResult<MessagePage> {
        let request = PageRequest::normalize(page, page_size, self.limits.page_size_max);

        let Some(caller) = caller else {
            return Ok(MessagePage::empty(request));
        };
        if self
            .repo
            .find_participant(conversation_id, caller)
            .await?
            .is_none()
        {
            return Ok(MessagePage::empty(request));
        }

        let total = self.repo.count_messages(conversation_id).await?;
        let mut items = self
            .repo
            .list_messages(conversation_id, request.offset(), request.limit())
            .await?;
        if !items.is_empty() {
            let users = self
                .repo
                .user_summaries(&read_state::participant_ids(&items))
                .await?;
            items = items
                .into_iter()
                .map(|m| m.with_profiles(&users))
                .collect();
        }

        let flipped = self
            .repo
            .mark_conversation_read(conversation_id, caller, Utc::now())
            .await?;
        if flipped > 0 {
            tracing::debug!(
                conversation_id = %conversation_id,
                user_id = %caller,
                flipped,
                "messages marked read"
            );
        }

        Ok(MessagePage::new(items, total, request))
    }

    /// Unread messages addressed to the caller across all conversations
    pub async fn get_unread_message_count(&self, caller: Option<Uuid>) -> AppResult<i64> {
        match caller {
            Some(user_id) => self.repo.count_unread(user_id).await,
            None => Ok(0),
        }
    }
}
