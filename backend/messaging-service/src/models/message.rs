use super::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    /// Whether the receiver has fetched this message
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserSummary>,
}

impl Message {
    /// Ids whose profiles [`Message::with_profiles`] will look up
    pub fn participant_ids(&self) -> [Uuid; 2] {
        [self.sender_id, self.receiver_id]
    }

    /// Attach sender and receiver profiles; users missing from `users` get a placeholder
    pub fn with_profiles(mut self, users: &HashMap<Uuid, UserSummary>) -> Self {
        let profile = |id: Uuid| {
            users
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UserSummary::unknown(id))
        };
        self.sender = Some(profile(self.sender_id));
        self.receiver = Some(profile(self.receiver_id));
        self
    }
}

/// Validated input for appending a message; content is already trimmed
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// 1-based page request, already clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Clamp raw query values: page to at least 1, page size to `[1, max_page_size]`
    pub fn normalize(page: Option<i64>, page_size: Option<i64>, max_page_size: u32) -> Self {
        let max_page_size = i64::from(max_page_size.max(1));
        let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let page_size = page_size
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, max_page_size);
        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            page_size: u32::try_from(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let pages = (total + self.limit() - 1) / self.limit();
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// One page of a conversation, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl MessagePage {
    pub fn new(items: Vec<Message>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: request.total_pages(total),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}
