use reserva_chat::PresenceRegistry;
use reserva_core::media::MediaStore;
use reserva_core::repository::{
    BookingRepository, CatalogRepository, ChatRepository, UserRepository,
};
use reserva_shared::models::events::ServerEvent;
use reserva_store::RedisClient;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<RedisClient>,
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub media: Arc<dyn MediaStore>,
    pub presence: Arc<PresenceRegistry>,
    pub events_tx: broadcast::Sender<ServerEvent>,
    pub auth: AuthConfig,
    pub business_rules: reserva_store::app_config::BusinessRules,
}
