use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{ConversationSummary, ParticipantPair};
use crate::repository::MessagingRepository;
use crate::services::read_state;
use std::sync::Arc;
use uuid::Uuid;

/// Direct conversations between pairs of users
#[derive(Clone)]
pub struct ConversationService {
    repo: Arc<dyn MessagingRepository>,
}

impl ConversationService {
    pub fn new(repo: Arc<dyn MessagingRepository>) -> Self {
        Self { repo }
    }

    /// Return the id of the one conversation between the caller and `other_user_id`,
    /// creating it (with both participant rows) if none exists yet.
    pub async fn get_or_create_conversation(
        &self,
        caller: Option<Uuid>,
        other_user_id: Uuid,
    ) -> AppResult<Uuid> {
        let caller = caller.ok_or(AppError::Unauthenticated)?;
        let pair = ParticipantPair::new(caller, other_user_id)
            .ok_or_else(|| AppError::InvalidTarget("Cannot message yourself".into()))?;

        if let Some(existing) = self.repo.find_conversation_by_pair(pair).await? {
            return Ok(existing.id);
        }

        if !self.repo.user_exists(other_user_id).await? {
            return Err(AppError::InvalidTarget("User not found".into()));
        }

        let (conversation, created) = self.repo.create_conversation(pair).await?;
        if created {
            metrics::CONVERSATIONS_CREATED_TOTAL.inc();
            tracing::info!(
                conversation_id = %conversation.id,
                user_id = %caller,
                other_user_id = %other_user_id,
                "conversation created"
            );
        }
        Ok(conversation.id)
    }

    /// The caller's conversations, most recently active first.
    ///
    /// Anonymous callers get an empty list.
    pub async fn list_conversations(
        &self,
        caller: Option<Uuid>,
    ) -> AppResult<Vec<ConversationSummary>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };

        let conversations = self.repo.conversations_for_user(caller).await?;
        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let conversation_ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
        let mut user_ids: Vec<Uuid> = conversations
            .iter()
            .filter_map(|c| c.other_participant(caller))
            .collect();
        user_ids.push(caller);

        let latest = self.repo.latest_messages(&conversation_ids).await?;
        let unread = self.repo.unread_counts_by_conversation(caller).await?;
        let users = self.repo.user_summaries(&user_ids).await?;

        Ok(read_state::summarize(
            conversations,
            caller,
            latest,
            &unread,
            &users,
        ))
    }
}
