use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reserva_catalog::{Listing, ListingType, Unit};
use reserva_core::repository::ListingFilter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub listing_type: ListingType,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub facilities: String,
    pub base_price: i64,
    /// Base64-encoded image payload, handed to the media store.
    pub image_data: String,
    pub image_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub facilities: Option<String>,
    pub base_price: Option<i64>,
    pub image_data: Option<String>,
    pub image_filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: Listing,
    pub units: Vec<Unit>,
}

// ============================================================================
// Public handlers
// ============================================================================

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/listings", get(browse_listings))
        .route("/v1/listings/{listing_id}", get(listing_details))
}

/// GET /v1/listings
/// Browse the catalog with optional type/text/price filters
async fn browse_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state
        .catalog
        .browse_listings(&filter)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(listings))
}

/// GET /v1/listings/:id
/// Listing detail including its units
async fn listing_details(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingDetailResponse>, AppError> {
    let listing = state
        .catalog
        .get_listing(listing_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    let units = state
        .catalog
        .list_units(listing_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(ListingDetailResponse { listing, units }))
}

// ============================================================================
// Vendor handlers
// ============================================================================

pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/vendors/listings",
            post(create_listing).get(my_listings),
        )
        .route(
            "/v1/vendors/listings/{listing_id}",
            axum::routing::patch(update_listing).delete(delete_listing),
        )
}

/// POST /v1/vendors/listings
async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let vendor_id = claims.user_id()?;

    let image_bytes = BASE64
        .decode(req.image_data.as_bytes())
        .map_err(|_| AppError::Validation("Listing image is not valid base64".to_string()))?;

    let filename = req.image_filename.as_deref().unwrap_or("listing.jpg");
    let image_url = state
        .media
        .store_image(filename, &image_bytes)
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = Listing::new(
        vendor_id,
        req.listing_type,
        req.name,
        req.address,
        req.description,
        req.facilities,
        req.base_price,
        image_url,
    )
    .map_err(AppError::catalog)?;

    state
        .catalog
        .create_listing(&listing)
        .await
        .map_err(AppError::repo)?;

    tracing::info!("Vendor {} published listing {}", vendor_id, listing.id);
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /v1/vendors/listings
async fn my_listings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let vendor_id = claims.user_id()?;
    let listings = state
        .catalog
        .list_vendor_listings(vendor_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(listings))
}

/// PATCH /v1/vendors/listings/:id
async fn update_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, AppError> {
    let vendor_id = claims.user_id()?;

    let mut listing = state
        .catalog
        .get_listing(listing_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    listing.authorize_vendor(vendor_id).map_err(AppError::catalog)?;

    if let Some(name) = req.name {
        listing.name = name;
    }
    if let Some(address) = req.address {
        listing.address = address;
    }
    if req.description.is_some() {
        listing.description = req.description;
    }
    if let Some(facilities) = req.facilities {
        listing.facilities = facilities;
    }
    if let Some(base_price) = req.base_price {
        if base_price < 0 {
            return Err(AppError::Validation(
                "Price must not be negative".to_string(),
            ));
        }
        listing.base_price = base_price;
    }
    if let Some(image_data) = req.image_data {
        let image_bytes = BASE64
            .decode(image_data.as_bytes())
            .map_err(|_| AppError::Validation("Listing image is not valid base64".to_string()))?;
        let filename = req.image_filename.as_deref().unwrap_or("listing.jpg");
        listing.image_url = state
            .media
            .store_image(filename, &image_bytes)
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    state
        .catalog
        .update_listing(&listing)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(listing))
}

/// DELETE /v1/vendors/listings/:id
async fn delete_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let vendor_id = claims.user_id()?;

    let deleted = state
        .catalog
        .delete_listing(listing_id, vendor_id)
        .await
        .map_err(AppError::repo)?;

    if !deleted {
        return Err(AppError::NotFound(
            "Listing not found or unauthorized".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
