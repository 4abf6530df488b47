//! Storage seam for the messaging core
//!
//! Every multi-row write is atomic inside one implementation call; services
//! never hold a transaction across calls.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMessagingRepository;
pub use postgres::PgMessagingRepository;

use crate::error::AppResult;
use crate::models::{
    Conversation, ConversationParticipant, Message, NewMessage, ParticipantPair, UserSummary,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait MessagingRepository: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool>;

    async fn user_summaries(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>>;

    async fn find_conversation_by_pair(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<Option<Conversation>>;

    /// Insert the conversation and both participant rows, or return the row
    /// another writer created for the same pair. The flag is `true` only for
    /// the call that created it.
    async fn create_conversation(&self, pair: ParticipantPair) -> AppResult<(Conversation, bool)>;

    async fn get_conversation(&self, conversation_id: Uuid) -> AppResult<Option<Conversation>>;

    async fn find_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ConversationParticipant>>;

    /// Conversations the user belongs to, most recently active first, ties by id
    async fn conversations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Latest message per conversation by (created_at, seq)
    async fn latest_messages(
        &self,
        conversation_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Message>>;

    /// Unread messages addressed to the user, grouped by conversation
    async fn unread_counts_by_conversation(&self, user_id: Uuid)
        -> AppResult<HashMap<Uuid, i64>>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;

    /// Append the message and bump the conversation's `updated_at` atomically.
    /// Fails with `ConversationNotFound` if the conversation is gone.
    async fn append_message(&self, message: NewMessage) -> AppResult<Message>;

    async fn count_messages(&self, conversation_id: Uuid) -> AppResult<i64>;

    /// Oldest first, ties broken by insertion sequence
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>>;

    /// Flip `read` on every message addressed to the user in this conversation
    /// and set their `last_read_at`, atomically. Returns how many were flipped.
    async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;
}
