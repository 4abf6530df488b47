//! Derived read state
//!
//! Unread counts and conversation summaries are computed from fetched rows on
//! every request; nothing here is stored.

use crate::models::{Conversation, ConversationSummary, Message, UserSummary};
use std::collections::HashMap;
use uuid::Uuid;

pub fn is_unread_for(message: &Message, user_id: Uuid) -> bool {
    message.receiver_id == user_id && !message.read
}

pub fn count_unread<'a, I>(messages: I, user_id: Uuid) -> i64
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .filter(|m| is_unread_for(m, user_id))
        .count() as i64
}

pub fn unread_by_conversation<'a, I>(messages: I, user_id: Uuid) -> HashMap<Uuid, i64>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut counts = HashMap::new();
    for message in messages.into_iter().filter(|m| is_unread_for(m, user_id)) {
        *counts.entry(message.conversation_id).or_insert(0) += 1;
    }
    counts
}

/// Every sender and receiver referenced by `messages`, deduplicated
pub fn participant_ids<'a, I>(messages: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut ids: Vec<Uuid> = messages
        .into_iter()
        .flat_map(Message::participant_ids)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Build the caller's list rows, preserving the order of `conversations`.
///
/// Conversations the caller is not part of are skipped. `users` should hold
/// the caller as well as the other participants so last-message profiles resolve.
pub fn summarize(
    conversations: Vec<Conversation>,
    caller: Uuid,
    mut latest: HashMap<Uuid, Message>,
    unread: &HashMap<Uuid, i64>,
    users: &HashMap<Uuid, UserSummary>,
) -> Vec<ConversationSummary> {
    conversations
        .into_iter()
        .filter_map(|conversation| {
            let other_id = conversation.other_participant(caller)?;
            let other_participant = users
                .get(&other_id)
                .cloned()
                .unwrap_or_else(|| UserSummary::unknown(other_id));
            Some(ConversationSummary {
                id: conversation.id,
                created_at: conversation.created_at,
                updated_at: conversation.updated_at,
                other_participant,
                last_message: latest
                    .remove(&conversation.id)
                    .map(|m| m.with_profiles(users)),
                unread_count: unread.get(&conversation.id).copied().unwrap_or(0),
            })
        })
        .collect()
}
