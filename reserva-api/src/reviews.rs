use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use reserva_booking::review::validate_review;
use reserva_booking::Review;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/reviews/{booking_id}", post(create_review))
}

/// POST /v1/reviews/:booking_id
/// One review per booking, only after the vendor marks it Completed.
async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let customer_id = claims.user_id()?;

    let booking = state
        .bookings
        .get_booking(booking_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let already_reviewed = state
        .bookings
        .has_review(booking_id)
        .await
        .map_err(AppError::repo)?;

    validate_review(&booking, customer_id, req.rating, already_reviewed)
        .map_err(AppError::booking)?;

    let review = Review::new(booking_id, customer_id, req.rating, req.comment);
    state
        .bookings
        .create_review(&review)
        .await
        .map_err(AppError::repo)?;

    Ok((StatusCode::CREATED, Json(review)))
}
