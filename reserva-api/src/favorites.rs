use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use reserva_core::repository::FavoriteEntry;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/favorites", get(list_favorites))
        .route(
            "/v1/favorites/{unit_id}",
            post(add_favorite).delete(remove_favorite),
        )
}

/// POST /v1/favorites/:unit_id
/// Idempotent: saving a unit twice is fine.
async fn add_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(unit_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let customer_id = claims.user_id()?;

    state
        .catalog
        .get_unit(unit_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;

    state
        .bookings
        .add_favorite(customer_id, unit_id)
        .await
        .map_err(AppError::repo)?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/favorites/:unit_id
async fn remove_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(unit_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let customer_id = claims.user_id()?;

    state
        .bookings
        .remove_favorite(customer_id, unit_id)
        .await
        .map_err(AppError::repo)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/favorites
async fn list_favorites(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<FavoriteEntry>>, AppError> {
    let customer_id = claims.user_id()?;

    let favorites = state
        .bookings
        .list_favorites(customer_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(favorites))
}
