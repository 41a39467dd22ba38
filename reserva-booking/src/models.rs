use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, crate::manager::BookingError> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(crate::manager::BookingError::UnknownStatus(
                other.to_string(),
            )),
        }
    }
}

/// Payment state carried on the booking record. There is no processor
/// integration; the amount is snapshotted from the unit price at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, crate::manager::BookingError> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(crate::manager::BookingError::UnknownStatus(
                other.to_string(),
            )),
        }
    }
}

/// A reservation of one unit for one slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub unit_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: Option<String>,
    pub status: BookingStatus,
    pub amount: i64,
    pub payment_status: PaymentStatus,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a Pending booking with the unit price snapshotted and a fresh
    /// transaction id minted.
    pub fn new(
        customer_id: Uuid,
        listing_id: Uuid,
        unit_id: Uuid,
        booking_date: NaiveDate,
        booking_time: Option<String>,
        amount: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            listing_id,
            unit_id,
            booking_date,
            booking_time,
            status: BookingStatus::Pending,
            amount,
            payment_status: PaymentStatus::Pending,
            transaction_id: format!("txn_{}", Uuid::new_v4().simple()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// Post-completion feedback, at most one per booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(booking_id: Uuid, customer_id: Uuid, rating: i32, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            customer_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}
