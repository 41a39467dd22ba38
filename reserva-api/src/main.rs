use reserva_api::{
    app,
    state::{AppState, AuthConfig},
};
use reserva_chat::PresenceRegistry;
use reserva_core::media::MockMediaStore;
use reserva_store::{
    PgBookingRepository, PgCatalogRepository, PgChatRepository, PgUserRepository,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reserva_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = reserva_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Reserva API on port {}", config.server.port);

    // Postgres
    let db = reserva_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis
    let redis_client = reserva_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    // Broadcast channel feeding the SSE streams
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let pool = db.pool.clone();
    let app_state = AppState {
        redis: redis_arc,
        users: Arc::new(PgUserRepository::new(pool.clone())),
        catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
        bookings: Arc::new(PgBookingRepository::new(pool.clone())),
        chat: Arc::new(PgChatRepository::new(pool)),
        media: Arc::new(MockMediaStore::new(&config.media.base_url)),
        presence: Arc::new(PresenceRegistry::new()),
        events_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
