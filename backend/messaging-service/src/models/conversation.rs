use super::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unordered pair of distinct users, stored sorted.
///
/// Both `new(a, b)` and `new(b, a)` produce the same key, which is what makes
/// one conversation per pair enforceable at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: Uuid,
    high: Uuid,
}

impl ParticipantPair {
    /// `None` when both ids are the same user
    pub fn new(a: Uuid, b: Uuid) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The member of the pair that is not `user_id`
    pub fn other(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn pair(&self) -> ParticipantPair {
        ParticipantPair {
            low: self.participant_low,
            high: self.participant_high,
        }
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.pair().contains(user_id)
    }

    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        self.pair().other(user_id)
    }
}

/// Per-user membership row; carries the user's read watermark
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ConversationParticipant {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Display fields of the other party, owned by the identity subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}

impl UserSummary {
    /// Placeholder for a participant whose user record is gone
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            avatar: None,
            role: None,
            company: None,
        }
    }
}

/// One row of the caller's conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub other_participant: UserSummary,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ParticipantPair::new(a, b), ParticipantPair::new(b, a));

        let pair = ParticipantPair::new(a, b).unwrap();
        assert!(pair.low() < pair.high());
    }

    #[test]
    fn test_pair_rejects_self() {
        let a = Uuid::new_v4();
        assert_eq!(ParticipantPair::new(a, a), None);
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pair = ParticipantPair::new(a, b).unwrap();
        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(b), Some(a));
        assert_eq!(pair.other(Uuid::new_v4()), None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let now = Utc::now();
        let summary = ConversationSummary {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            other_participant: UserSummary::unknown(Uuid::new_v4()),
            last_message: None,
            unread_count: 0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("otherParticipant").is_some());
        assert!(json["lastMessage"].is_null());
        assert_eq!(json["unreadCount"], 0);
    }
}
