use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct MessageReceivedEvent {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub sent_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct MessagesReadEvent {
    pub conversation_id: Uuid,
    pub reader_id: Uuid,
    pub recipient_id: Uuid,
    pub read_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TypingEvent {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub recipient_id: Uuid,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub listing_id: Uuid,
    pub unit_id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub booking_date: chrono::NaiveDate,
    pub booking_time: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingStatusChangedEvent {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub changed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PresenceChangedEvent {
    pub user_id: Uuid,
    pub online: bool,
}

/// Everything fanned out on the process-wide broadcast channel.
///
/// Events addressed to a single user carry a recipient id; the SSE layer
/// filters on it. Presence changes go to every connected client.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    MessageReceived(MessageReceivedEvent),
    MessagesRead(MessagesReadEvent),
    TypingStarted(TypingEvent),
    TypingStopped(TypingEvent),
    BookingCreated(BookingCreatedEvent),
    BookingStatusChanged(BookingStatusChangedEvent),
    PresenceChanged(PresenceChangedEvent),
}

impl ServerEvent {
    /// SSE event name for the client side.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::MessageReceived(_) => "message:received",
            ServerEvent::MessagesRead(_) => "messages:read",
            ServerEvent::TypingStarted(_) => "typing:started",
            ServerEvent::TypingStopped(_) => "typing:stopped",
            ServerEvent::BookingCreated(_) => "booking:created",
            ServerEvent::BookingStatusChanged(_) => "booking:status",
            ServerEvent::PresenceChanged(_) => "presence:changed",
        }
    }

    /// The user this event is addressed to, or None for fan-out to everyone.
    pub fn recipient(&self) -> Option<Uuid> {
        match self {
            ServerEvent::MessageReceived(e) => Some(e.recipient_id),
            ServerEvent::MessagesRead(e) => Some(e.recipient_id),
            ServerEvent::TypingStarted(e) | ServerEvent::TypingStopped(e) => {
                Some(e.recipient_id)
            }
            ServerEvent::BookingCreated(e) => Some(e.vendor_id),
            ServerEvent::BookingStatusChanged(e) => Some(e.customer_id),
            ServerEvent::PresenceChanged(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_targeting() {
        let vendor = Uuid::new_v4();
        let event = ServerEvent::BookingCreated(BookingCreatedEvent {
            booking_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            vendor_id: vendor,
            booking_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            booking_time: Some("19:30".to_string()),
            created_at: 0,
        });

        assert_eq!(event.recipient(), Some(vendor));
        assert_eq!(event.name(), "booking:created");

        let presence = ServerEvent::PresenceChanged(PresenceChangedEvent {
            user_id: Uuid::new_v4(),
            online: true,
        });
        assert_eq!(presence.recipient(), None);
    }
}
