use async_trait::async_trait;
use reserva_chat::models::canonical_pair;
use reserva_chat::{Conversation, Message};
use reserva_core::repository::{ChatRepository, RepoError};
use reserva_core::user::{UserRole, UserSummary};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    participant_a: Uuid,
    participant_b: Uuid,
    last_message: String,
    last_message_time: chrono::DateTime<chrono::Utc>,
    unread_a: i32,
    unread_b: i32,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: row.id,
            participant_a: row.participant_a,
            participant_b: row.participant_b,
            last_message: row.last_message,
            last_message_time: row.last_message_time,
            unread_a: row.unread_a,
            unread_b: row.unread_b,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: String,
    is_read: bool,
    read_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            content: row.content,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserSummaryRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
}

const CONVERSATION_COLUMNS: &str = "id, participant_a, participant_b, last_message, last_message_time, unread_a, unread_b, created_at";
const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, content, is_read, read_at, created_at";

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn get_or_create_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Conversation, RepoError> {
        let (first, second) = canonical_pair(user_a, user_b)?;

        if let Some(row) = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE participant_a = $1 AND participant_b = $2",
            CONVERSATION_COLUMNS
        ))
        .bind(first)
        .bind(second)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(row.into());
        }

        let conversation = Conversation::new(user_a, user_b)?;
        sqlx::query(
            r#"
            INSERT INTO conversations (id, participant_a, participant_b, last_message, last_message_time, unread_a, unread_b, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (participant_a, participant_b) DO NOTHING
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.participant_a)
        .bind(conversation.participant_b)
        .bind(&conversation.last_message)
        .bind(conversation.last_message_time)
        .bind(conversation.unread_a)
        .bind(conversation.unread_b)
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await?;

        // Re-read in case a concurrent request won the insert race.
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE participant_a = $1 AND participant_b = $2",
            CONVERSATION_COLUMNS
        ))
        .bind(first)
        .bind(second)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, RepoError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, RepoError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE participant_a = $1 OR participant_b = $1
            ORDER BY last_message_time DESC
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Message>, i64), RepoError> {
        let offset = (page - 1).max(0) * limit;

        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(conversation_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create_message(
        &self,
        message: &Message,
        recipient_id: Uuid,
    ) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, content, is_read, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.read_at)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message = $2,
                last_message_time = $3,
                unread_a = unread_a + CASE WHEN participant_a = $4 THEN 1 ELSE 0 END,
                unread_b = unread_b + CASE WHEN participant_b = $4 THEN 1 ELSE 0 END
            WHERE id = $1
            "#,
        )
        .bind(message.conversation_id)
        .bind(&message.content)
        .bind(message.created_at)
        .bind(recipient_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = NOW()
            WHERE conversation_id = $1 AND sender_id <> $2 AND is_read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET unread_a = CASE WHEN participant_a = $2 THEN 0 ELSE unread_a END,
                unread_b = CASE WHEN participant_b = $2 THEN 0 ELSE unread_b END
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn total_unread(&self, user_id: Uuid) -> Result<i64, RepoError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN participant_a = $1 THEN unread_a
                     WHEN participant_b = $1 THEN unread_b
                     ELSE 0 END
            ), 0)::BIGINT
            FROM conversations
            WHERE participant_a = $1 OR participant_b = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn search_users(
        &self,
        exclude: Uuid,
        role: Option<UserRole>,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UserSummary>, RepoError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE id <> $1
              AND ($2::TEXT IS NULL OR role = $2)
              AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%' OR email ILIKE '%' || $3 || '%')
            ORDER BY name
            LIMIT $4
            "#,
        )
        .bind(exclude)
        .bind(role.map(|r| r.as_str()))
        .bind(search)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let role = UserRole::parse(&row.role)
                    .ok_or_else(|| format!("unknown role in users table: {}", row.role))?;
                Ok(UserSummary {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    role,
                })
            })
            .collect()
    }
}
