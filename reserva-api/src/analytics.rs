use axum::{extract::State, routing::get, Extension, Json, Router};
use reserva_core::repository::ListingAnalytics;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/vendors/analytics", get(vendor_analytics))
}

/// GET /v1/vendors/analytics
/// Completed-booking count and revenue per owned listing
async fn vendor_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ListingAnalytics>>, AppError> {
    let vendor_id = claims.user_id()?;

    let analytics = state
        .bookings
        .vendor_analytics(vendor_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(analytics))
}
