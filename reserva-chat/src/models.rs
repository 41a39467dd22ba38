use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A two-party thread between a customer and a vendor.
///
/// Participants are stored in canonical order (smaller uuid first) so one
/// pair of users maps to exactly one conversation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_a: i32,
    pub unread_b: i32,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation between two distinct users.
    pub fn new(user_a: Uuid, user_b: Uuid) -> Result<Self, ChatError> {
        let (participant_a, participant_b) = canonical_pair(user_a, user_b)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            participant_a,
            participant_b,
            last_message: String::new(),
            last_message_time: now,
            unread_a: 0,
            unread_b: 0,
            created_at: now,
        })
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The other side of the thread, for unread bumps and delivery.
    pub fn other_participant(&self, user_id: Uuid) -> Result<Uuid, ChatError> {
        if user_id == self.participant_a {
            Ok(self.participant_b)
        } else if user_id == self.participant_b {
            Ok(self.participant_a)
        } else {
            Err(ChatError::NotParticipant {
                conversation_id: self.id,
            })
        }
    }

    pub fn unread_for(&self, user_id: Uuid) -> i32 {
        if user_id == self.participant_a {
            self.unread_a
        } else if user_id == self.participant_b {
            self.unread_b
        } else {
            0
        }
    }
}

/// Order a pair of participants canonically, rejecting self-conversations.
pub fn canonical_pair(user_a: Uuid, user_b: Uuid) -> Result<(Uuid, Uuid), ChatError> {
    if user_a == user_b {
        return Err(ChatError::SelfConversation);
    }
    if user_a < user_b {
        Ok((user_a, user_b))
    } else {
        Ok((user_b, user_a))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message, trimming and rejecting blank content.
    pub fn new(conversation_id: Uuid, sender_id: Uuid, content: &str) -> Result<Self, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content: content.to_string(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("Not a participant in conversation {conversation_id}")]
    NotParticipant { conversation_id: Uuid },

    #[error("Cannot start a conversation with yourself")]
    SelfConversation,

    #[error("Message content must not be empty")]
    EmptyMessage,

    #[error("User not found: {0}")]
    UserNotFound(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ordering_is_stable() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(canonical_pair(a, b).unwrap(), canonical_pair(b, a).unwrap());
        assert!(matches!(
            canonical_pair(a, a),
            Err(ChatError::SelfConversation)
        ));
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conversation = Conversation::new(a, b).unwrap();

        assert_eq!(conversation.other_participant(a).unwrap(), b);
        assert_eq!(conversation.other_participant(b).unwrap(), a);
        assert!(conversation.other_participant(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_message_content_is_trimmed() {
        let message =
            Message::new(Uuid::new_v4(), Uuid::new_v4(), "  table for two?  ").unwrap();
        assert_eq!(message.content, "table for two?");
        assert!(!message.is_read);

        assert!(matches!(
            Message::new(Uuid::new_v4(), Uuid::new_v4(), "   "),
            Err(ChatError::EmptyMessage)
        ));
    }
}
