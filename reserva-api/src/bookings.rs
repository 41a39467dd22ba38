use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use reserva_booking::availability;
use reserva_booking::{Booking, BookingStatus, StatusGate};
use reserva_core::repository::{BookingHistoryEntry, VendorBookingEntry};
use reserva_shared::models::events::{
    BookingCreatedEvent, BookingStatusChangedEvent, ServerEvent,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    /// "HH:MM" slot for table bookings; room bookings omit it.
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{listing_id}/{unit_id}", post(create_booking))
        .route("/v1/bookings/history", get(booking_history))
}

pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vendors/bookings", get(vendor_bookings))
        .route(
            "/v1/vendors/bookings/{booking_id}/status",
            patch(update_booking_status),
        )
}

/// POST /v1/bookings/:listing_id/:unit_id
/// Reserve a unit for a slot. The confirmed-count capacity check runs in the
/// store transaction; the cache only pre-screens obviously full slots.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((listing_id, unit_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let customer_id = claims.user_id()?;

    // 1. Resolve listing and unit
    let listing = state
        .catalog
        .get_listing(listing_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    let unit = state
        .catalog
        .get_unit(unit_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;

    availability::ensure_bookable(&unit, listing_id).map_err(AppError::booking)?;

    // 2. Fast-path reject from the occupancy cache when the slot is known full
    if let Ok(Some(cached)) = state
        .redis
        .get_slot_occupancy(unit_id, req.date, req.time.as_deref())
        .await
    {
        availability::check_capacity(cached, unit.capacity).map_err(AppError::booking)?;
    }

    // 3. Insert with the authoritative transactional count
    let booking = Booking::new(
        customer_id,
        listing_id,
        unit_id,
        req.date,
        req.time.clone(),
        unit.price,
    );

    state
        .bookings
        .create_booking(&booking, unit.capacity)
        .await
        .map_err(AppError::repo)?;

    tracing::info!(
        "Booking {} created for unit {} on {}",
        booking.id,
        unit_id,
        req.date
    );

    // 4. Notify the vendor's live stream
    let _ = state
        .events_tx
        .send(ServerEvent::BookingCreated(BookingCreatedEvent {
            booking_id: booking.id,
            listing_id,
            unit_id,
            customer_id,
            vendor_id: listing.vendor_id,
            booking_date: req.date,
            booking_time: req.time,
            created_at: Utc::now().timestamp(),
        }));

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings/history
async fn booking_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BookingHistoryEntry>>, AppError> {
    let customer_id = claims.user_id()?;
    let bookings = state
        .bookings
        .list_customer_bookings(customer_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(bookings))
}

/// GET /v1/vendors/bookings
async fn vendor_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<VendorBookingEntry>>, AppError> {
    let vendor_id = claims.user_id()?;
    let bookings = state
        .bookings
        .list_vendor_bookings(vendor_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(bookings))
}

/// PATCH /v1/vendors/bookings/:id/status
/// Drive a booking through the lifecycle gate.
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let vendor_id = claims.user_id()?;

    // 1. Resolve booking and its listing's owner
    let mut booking = state
        .bookings
        .get_booking(booking_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let listing = state
        .catalog
        .get_listing(booking.listing_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    // 2. Gate: ownership first, then the transition table
    StatusGate::authorize_vendor(listing.vendor_id, vendor_id).map_err(AppError::booking)?;
    StatusGate::apply(&mut booking, req.status).map_err(AppError::booking)?;

    state
        .bookings
        .update_booking_status(booking_id, booking.status)
        .await
        .map_err(AppError::repo)?;

    // 3. Keep the occupancy cache in step with confirmed counts
    match booking.status {
        BookingStatus::Confirmed => {
            match state
                .redis
                .incr_slot_occupancy(
                    booking.unit_id,
                    booking.booking_date,
                    booking.booking_time.as_deref(),
                )
                .await
            {
                Ok(Some(count)) => {
                    tracing::debug!("Slot occupancy for unit {} now {}", booking.unit_id, count);
                }
                Ok(None) => {
                    // Cache miss: leave it cold, the next read seeds from SQL
                }
                Err(e) => {
                    tracing::error!("Failed to bump occupancy cache: {}", e);
                }
            }
        }
        BookingStatus::Completed => {
            let _ = state
                .redis
                .del_slot_occupancy(
                    booking.unit_id,
                    booking.booking_date,
                    booking.booking_time.as_deref(),
                )
                .await;
        }
        _ => {}
    }

    // 4. Tell the customer's live stream
    let _ = state
        .events_tx
        .send(ServerEvent::BookingStatusChanged(BookingStatusChangedEvent {
            booking_id,
            customer_id: booking.customer_id,
            status: booking.status.as_str().to_string(),
            changed_at: Utc::now().timestamp(),
        }));

    tracing::info!(
        "Booking {} moved to {} by vendor {}",
        booking_id,
        booking.status.as_str(),
        vendor_id
    );

    Ok(Json(booking))
}
