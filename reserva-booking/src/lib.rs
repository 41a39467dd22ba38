pub mod availability;
pub mod manager;
pub mod models;
pub mod review;

pub use manager::{BookingError, StatusGate};
pub use models::{Booking, BookingStatus, PaymentStatus, Review};
