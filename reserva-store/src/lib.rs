pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod chat_repo;
pub mod database;
pub mod redis_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use catalog_repo::PgCatalogRepository;
pub use chat_repo::PgChatRepository;
pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use user_repo::PgUserRepository;
