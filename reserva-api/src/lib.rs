use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod chat;
pub mod error;
pub mod favorites;
pub mod listings;
pub mod middleware;
pub mod reviews;
pub mod state;
pub mod units;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let public = Router::new()
        .nest("/v1/auth", auth::routes())
        .merge(listings::public_routes())
        // EventSource clients authenticate via query param, not header
        .route("/v1/chat/stream", get(chat::stream));

    // Chat is shared by both roles, any valid token passes
    let authenticated = chat::routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::auth_middleware,
    ));

    let customer = Router::new()
        .merge(bookings::customer_routes())
        .merge(reviews::routes())
        .merge(favorites::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    let vendor = Router::new()
        .merge(listings::vendor_routes())
        .merge(units::routes())
        .merge(bookings::vendor_routes())
        .merge(analytics::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::vendor_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(customer)
        .merge(vendor)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let ip = addr.ip().to_string();
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(
            &key,
            state.business_rules.rate_limit_requests,
            state.business_rules.rate_limit_window_seconds,
        )
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
        )),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
