use crate::models::{Booking, BookingStatus};
use uuid::Uuid;

/// Enforces the booking lifecycle and who may drive it.
///
/// Transition table:
///   Pending   -> Confirmed | Cancelled
///   Confirmed -> Completed
/// Everything else is rejected. Only the vendor owning the booking's listing
/// may transition it.
pub struct StatusGate;

impl StatusGate {
    pub fn validate(from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
        let allowed = matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        );

        if !allowed {
            return Err(BookingError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Apply a transition to a booking after validating it.
    pub fn apply(booking: &mut Booking, to: BookingStatus) -> Result<(), BookingError> {
        Self::validate(booking.status, to)?;
        booking.update_status(to);
        Ok(())
    }

    /// Check the acting vendor against the listing's owner.
    pub fn authorize_vendor(listing_vendor_id: Uuid, actor_id: Uuid) -> Result<(), BookingError> {
        if listing_vendor_id != actor_id {
            return Err(BookingError::NotListingVendor);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Only the vendor owning the listing may update this booking")]
    NotListingVendor,

    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),

    #[error("Unit is not open for booking")]
    UnitUnavailable,

    #[error("Unit does not belong to the requested listing")]
    UnitNotInListing,

    #[error("No space left on this slot: {booked} confirmed of capacity {capacity}")]
    SlotFull { booked: i64, capacity: i32 },

    #[error("Booking already has a review")]
    AlreadyReviewed,

    #[error("Reviews require a completed booking")]
    BookingNotCompleted,

    #[error("Only the booking's customer may review it")]
    NotBookingCustomer,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pending_booking() -> Booking {
        Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            Some("19:30".to_string()),
            2500,
        )
    }

    #[test]
    fn test_booking_lifecycle() {
        let mut booking = pending_booking();
        assert_eq!(booking.status, BookingStatus::Pending);

        // Pending -> Confirmed
        StatusGate::apply(&mut booking, BookingStatus::Confirmed).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        // Confirmed -> Completed
        StatusGate::apply(&mut booking, BookingStatus::Completed).unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[test]
    fn test_pending_can_be_cancelled() {
        let mut booking = pending_booking();
        StatusGate::apply(&mut booking, BookingStatus::Cancelled).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        // Cannot complete a booking that was never confirmed
        let mut booking = pending_booking();
        let result = StatusGate::apply(&mut booking, BookingStatus::Completed);
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
        assert_eq!(booking.status, BookingStatus::Pending);

        // Cancelled is terminal
        StatusGate::apply(&mut booking, BookingStatus::Cancelled).unwrap();
        assert!(StatusGate::apply(&mut booking, BookingStatus::Confirmed).is_err());

        // Confirmed cannot go back to Pending
        assert!(StatusGate::validate(BookingStatus::Confirmed, BookingStatus::Pending).is_err());
    }

    #[test]
    fn test_vendor_gate() {
        let owner = Uuid::new_v4();
        assert!(StatusGate::authorize_vendor(owner, owner).is_ok());
        assert!(matches!(
            StatusGate::authorize_vendor(owner, Uuid::new_v4()),
            Err(BookingError::NotListingVendor)
        ));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("ARCHIVED").is_err());
    }
}
