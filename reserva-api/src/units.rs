use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Extension, Json, Router,
};
use reserva_catalog::{Listing, Unit};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    pub name: String,
    pub capacity: i32,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUnitRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<i64>,
    pub availability: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vendors/listings/{listing_id}/units", post(create_unit))
        .route(
            "/v1/vendors/units/{unit_id}",
            patch(update_unit).delete(delete_unit),
        )
}

async fn owned_listing(
    state: &AppState,
    listing_id: Uuid,
    vendor_id: Uuid,
) -> Result<Listing, AppError> {
    let listing = state
        .catalog
        .get_listing(listing_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    listing.authorize_vendor(vendor_id).map_err(AppError::catalog)?;
    Ok(listing)
}

/// POST /v1/vendors/listings/:id/units
/// The unit type follows the listing type: restaurants add tables,
/// hotels add rooms.
async fn create_unit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    let vendor_id = claims.user_id()?;
    let listing = owned_listing(&state, listing_id, vendor_id).await?;

    let unit = Unit::new(
        listing.id,
        listing.listing_type.unit_type(),
        req.name,
        req.capacity,
        req.price,
    )
    .map_err(AppError::catalog)?;

    state
        .catalog
        .create_unit(&unit)
        .await
        .map_err(AppError::repo)?;

    Ok((StatusCode::CREATED, Json(unit)))
}

/// PATCH /v1/vendors/units/:id
async fn update_unit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(unit_id): Path<Uuid>,
    Json(req): Json<UpdateUnitRequest>,
) -> Result<Json<Unit>, AppError> {
    let vendor_id = claims.user_id()?;

    let mut unit = state
        .catalog
        .get_unit(unit_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;

    owned_listing(&state, unit.listing_id, vendor_id).await?;

    if let Some(name) = req.name {
        unit.name = name;
    }
    if let Some(capacity) = req.capacity {
        if capacity <= 0 {
            return Err(AppError::Validation(
                "Capacity must be positive".to_string(),
            ));
        }
        unit.capacity = capacity;
    }
    if let Some(price) = req.price {
        if price < 0 {
            return Err(AppError::Validation(
                "Price must not be negative".to_string(),
            ));
        }
        unit.price = price;
    }
    if let Some(availability) = req.availability {
        unit.availability = availability;
    }

    state
        .catalog
        .update_unit(&unit)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(unit))
}

/// DELETE /v1/vendors/units/:id
async fn delete_unit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(unit_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let vendor_id = claims.user_id()?;

    let unit = state
        .catalog
        .get_unit(unit_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;

    owned_listing(&state, unit.listing_id, vendor_id).await?;

    state
        .catalog
        .delete_unit(unit_id)
        .await
        .map_err(AppError::repo)?;

    Ok(StatusCode::NO_CONTENT)
}
