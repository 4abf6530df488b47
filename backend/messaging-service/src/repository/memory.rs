//! Process-local store for tests and `STORE_BACKEND=memory`
//!
//! A single `RwLock` serializes writers, which gives the same atomicity the
//! PostgreSQL implementation gets from transactions.

use super::MessagingRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    Conversation, ConversationParticipant, Message, NewMessage, ParticipantPair, UserSummary,
};
use crate::services::read_state;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredMessage {
    seq: i64,
    message: Message,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, UserSummary>,
    conversations: HashMap<Uuid, Conversation>,
    pairs: HashMap<ParticipantPair, Uuid>,
    /// Keyed by (conversation_id, user_id)
    participants: HashMap<(Uuid, Uuid), ConversationParticipant>,
    messages: HashMap<Uuid, Vec<StoredMessage>>,
    next_seq: i64,
}

impl MemoryState {
    fn ordered_messages(&self, conversation_id: Uuid) -> Vec<&StoredMessage> {
        let mut stored: Vec<&StoredMessage> = self
            .messages
            .get(&conversation_id)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        stored.sort_by_key(|m| (m.message.created_at, m.seq));
        stored
    }

    fn all_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values().flatten().map(|m| &m.message)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMessagingRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryMessagingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user the way the identity subsystem would
    pub async fn insert_user(&self, user: UserSummary) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Drop a conversation and everything hanging off it
    #[cfg(test)]
    async fn delete_conversation(&self, conversation_id: Uuid) {
        let mut state = self.state.write().await;
        if let Some(conversation) = state.conversations.remove(&conversation_id) {
            state.pairs.remove(&conversation.pair());
        }
        state.participants.retain(|(cid, _), _| *cid != conversation_id);
        state.messages.remove(&conversation_id);
    }
}

#[async_trait::async_trait]
impl MessagingRepository for InMemoryMessagingRepository {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains_key(&user_id))
    }

    async fn user_summaries(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }

    async fn find_conversation_by_pair(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state
            .pairs
            .get(&pair)
            .and_then(|id| state.conversations.get(id))
            .cloned())
    }

    async fn create_conversation(&self, pair: ParticipantPair) -> AppResult<(Conversation, bool)> {
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .pairs
            .get(&pair)
            .and_then(|id| state.conversations.get(id))
        {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            participant_low: pair.low(),
            participant_high: pair.high(),
            created_at: now,
            updated_at: now,
        };

        state.pairs.insert(pair, conversation.id);
        for user_id in [pair.low(), pair.high()] {
            state.participants.insert(
                (conversation.id, user_id),
                ConversationParticipant {
                    user_id,
                    conversation_id: conversation.id,
                    last_read_at: None,
                },
            );
        }
        state
            .conversations
            .insert(conversation.id, conversation.clone());

        Ok((conversation, true))
    }

    async fn get_conversation(&self, conversation_id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self
            .state
            .read()
            .await
            .conversations
            .get(&conversation_id)
            .cloned())
    }

    async fn find_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ConversationParticipant>> {
        Ok(self
            .state
            .read()
            .await
            .participants
            .get(&(conversation_id, user_id))
            .cloned())
    }

    async fn conversations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let state = self.state.read().await;
        let mut conversations: Vec<Conversation> = state
            .participants
            .keys()
            .filter(|(_, uid)| *uid == user_id)
            .filter_map(|(cid, _)| state.conversations.get(cid).cloned())
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(conversations)
    }

    async fn latest_messages(
        &self,
        conversation_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Message>> {
        let state = self.state.read().await;
        Ok(conversation_ids
            .iter()
            .filter_map(|cid| {
                state
                    .ordered_messages(*cid)
                    .last()
                    .map(|m| (*cid, m.message.clone()))
            })
            .collect())
    }

    async fn unread_counts_by_conversation(
        &self,
        user_id: Uuid,
    ) -> AppResult<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        Ok(read_state::unread_by_conversation(state.all_messages(), user_id))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(read_state::count_unread(state.all_messages(), user_id))
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut state = self.state.write().await;

        let conversation = state
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or(AppError::ConversationNotFound)?;
        if message.created_at > conversation.updated_at {
            conversation.updated_at = message.created_at;
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        let stored = Message {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            read: false,
            created_at: message.created_at,
            sender: None,
            receiver: None,
        };
        state
            .messages
            .entry(stored.conversation_id)
            .or_default()
            .push(StoredMessage {
                seq,
                message: stored.clone(),
            });

        Ok(stored)
    }

    async fn count_messages(&self, conversation_id: Uuid) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .get(&conversation_id)
            .map(|v| v.len() as i64)
            .unwrap_or(0))
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(state
            .ordered_messages(conversation_id)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|m| m.message.clone())
            .collect())
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;

        let mut flipped = 0;
        if let Some(messages) = state.messages.get_mut(&conversation_id) {
            for stored in messages.iter_mut() {
                if read_state::is_unread_for(&stored.message, user_id) {
                    stored.message.read = true;
                    flipped += 1;
                }
            }
        }

        if let Some(participant) = state.participants.get_mut(&(conversation_id, user_id)) {
            participant.last_read_at = Some(at);
        }

        Ok(flipped)
    }
}
