use super::MessagingRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    Conversation, ConversationParticipant, Message, NewMessage, ParticipantPair, UserSummary,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str =
    "id, participant_low, participant_high, created_at, updated_at";
const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, receiver_id, content, read, created_at";

#[derive(Clone)]
pub struct PgMessagingRepository {
    pool: PgPool,
}

impl PgMessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessagingRepository for PgMessagingRepository {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn user_summaries(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, avatar, role, company FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn find_conversation_by_pair(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<Option<Conversation>> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE participant_low = $1 AND participant_high = $2"
        );
        let row = sqlx::query_as::<_, Conversation>(&query)
            .bind(pair.low())
            .bind(pair.high())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_conversation(&self, pair: ParticipantPair) -> AppResult<(Conversation, bool)> {
        let mut tx = self.pool.begin().await?;

        // A concurrent creator for the same pair blocks here until it commits,
        // then the conflict makes this insert a no-op.
        let insert = format!(
            "INSERT INTO conversations (id, participant_low, participant_high) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (participant_low, participant_high) DO NOTHING \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Conversation>(&insert)
            .bind(Uuid::new_v4())
            .bind(pair.low())
            .bind(pair.high())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(conversation) = inserted else {
            tx.rollback().await?;
            let existing = self.find_conversation_by_pair(pair).await?.ok_or_else(|| {
                AppError::Database("conversation pair conflicted but no row is visible".into())
            })?;
            return Ok((existing, false));
        };

        sqlx::query(
            r#"
            INSERT INTO conversation_participants (user_id, conversation_id)
            VALUES ($1, $3), ($2, $3)
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .bind(conversation.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((conversation, true))
    }

    async fn get_conversation(&self, conversation_id: Uuid) -> AppResult<Option<Conversation>> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        let row = sqlx::query_as::<_, Conversation>(&query)
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ConversationParticipant>> {
        let row = sqlx::query_as::<_, ConversationParticipant>(
            r#"
            SELECT user_id, conversation_id, last_read_at
            FROM conversation_participants
            WHERE conversation_id = $1 AND user_id = $2
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn conversations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT c.id, c.participant_low, c.participant_high, c.created_at, c.updated_at
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE p.user_id = $1
            ORDER BY c.updated_at DESC, c.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn latest_messages(
        &self,
        conversation_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Message>> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!(
            "SELECT DISTINCT ON (conversation_id) {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = ANY($1) \
             ORDER BY conversation_id, created_at DESC, seq DESC"
        );
        let rows = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|m| (m.conversation_id, m)).collect())
    }

    async fn unread_counts_by_conversation(
        &self,
        user_id: Uuid,
    ) -> AppResult<HashMap<Uuid, i64>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT conversation_id, COUNT(*)::BIGINT
            FROM messages
            WHERE receiver_id = $1 AND read = FALSE
            GROUP BY conversation_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM messages WHERE receiver_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut tx = self.pool.begin().await?;

        // Locks the conversation row, so appends to one conversation serialize
        let bumped = sqlx::query(
            "UPDATE conversations SET updated_at = GREATEST(updated_at, $2) WHERE id = $1",
        )
        .bind(message.conversation_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(AppError::ConversationNotFound);
        }

        let insert = format!(
            "INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Message>(&insert)
            .bind(message.id)
            .bind(message.conversation_id)
            .bind(message.sender_id)
            .bind(message.receiver_id)
            .bind(&message.content)
            .bind(message.created_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn count_messages(&self, conversation_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM messages WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, seq ASC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE messages SET read = TRUE
            WHERE conversation_id = $1 AND receiver_id = $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"
            UPDATE conversation_participants SET last_read_at = $3
            WHERE conversation_id = $1 AND user_id = $2
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(flipped)
    }
}
