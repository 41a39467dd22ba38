use crate::manager::BookingError;
use crate::models::{Booking, BookingStatus};
use uuid::Uuid;

/// Gate for review creation: completed booking, reviewed by its customer,
/// rating within 1..=5, not reviewed before. Uniqueness is re-checked by the
/// store's unique index in case two requests race past this check.
pub fn validate_review(
    booking: &Booking,
    customer_id: Uuid,
    rating: i32,
    already_reviewed: bool,
) -> Result<(), BookingError> {
    if booking.customer_id != customer_id {
        return Err(BookingError::NotBookingCustomer);
    }
    if booking.status != BookingStatus::Completed {
        return Err(BookingError::BookingNotCompleted);
    }
    if !(1..=5).contains(&rating) {
        return Err(BookingError::InvalidRating(rating));
    }
    if already_reviewed {
        return Err(BookingError::AlreadyReviewed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::StatusGate;
    use chrono::NaiveDate;

    fn completed_booking(customer_id: Uuid) -> Booking {
        let mut booking = Booking::new(
            customer_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            None,
            8000,
        );
        StatusGate::apply(&mut booking, BookingStatus::Confirmed).unwrap();
        StatusGate::apply(&mut booking, BookingStatus::Completed).unwrap();
        booking
    }

    #[test]
    fn test_completed_booking_can_be_reviewed_once() {
        let customer = Uuid::new_v4();
        let booking = completed_booking(customer);

        assert!(validate_review(&booking, customer, 5, false).is_ok());
        assert!(matches!(
            validate_review(&booking, customer, 5, true),
            Err(BookingError::AlreadyReviewed)
        ));
    }

    #[test]
    fn test_pending_booking_cannot_be_reviewed() {
        let customer = Uuid::new_v4();
        let booking = Booking::new(
            customer,
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            None,
            8000,
        );

        assert!(matches!(
            validate_review(&booking, customer, 4, false),
            Err(BookingError::BookingNotCompleted)
        ));
    }

    #[test]
    fn test_only_booking_customer_may_review() {
        let booking = completed_booking(Uuid::new_v4());
        assert!(matches!(
            validate_review(&booking, Uuid::new_v4(), 4, false),
            Err(BookingError::NotBookingCustomer)
        ));
    }

    #[test]
    fn test_rating_bounds() {
        let customer = Uuid::new_v4();
        let booking = completed_booking(customer);

        for rating in 1..=5 {
            assert!(validate_review(&booking, customer, rating, false).is_ok());
        }
        assert!(matches!(
            validate_review(&booking, customer, 0, false),
            Err(BookingError::InvalidRating(0))
        ));
        assert!(matches!(
            validate_review(&booking, customer, 6, false),
            Err(BookingError::InvalidRating(6))
        ));
    }
}
