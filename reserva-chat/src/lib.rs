pub mod models;
pub mod presence;

pub use models::{ChatError, Conversation, Message};
pub use presence::PresenceRegistry;
