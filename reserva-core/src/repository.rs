use crate::user::{User, UserRole, UserSummary};
use async_trait::async_trait;
use chrono::NaiveDate;
use reserva_booking::{Booking, BookingStatus, Review};
use reserva_catalog::{Listing, Unit};
use reserva_chat::{Conversation, Message};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Browse-time filters over the public catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    pub listing_type: Option<String>,
    pub search: Option<String>,
    pub max_price: Option<i64>,
}

/// A customer's booking joined with catalog context.
#[derive(Debug, Clone, Serialize)]
pub struct BookingHistoryEntry {
    #[serde(flatten)]
    pub booking: Booking,
    pub listing_name: String,
    pub unit_name: String,
}

/// A vendor-side booking row joined with the customer identity.
#[derive(Debug, Clone, Serialize)]
pub struct VendorBookingEntry {
    #[serde(flatten)]
    pub booking: Booking,
    pub listing_name: String,
    pub unit_name: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// A saved unit joined with its listing.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteEntry {
    pub unit: Unit,
    pub listing_name: String,
    pub listing_type: String,
    pub listing_image_url: String,
}

/// Completed-booking volume and revenue per owned listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingAnalytics {
    pub listing_id: Uuid,
    pub name: String,
    pub total_bookings: i64,
    pub total_revenue: i64,
}

/// Repository trait for account data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
}

/// Repository trait for listing and unit data access
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_listing(&self, listing: &Listing) -> Result<(), RepoError>;

    async fn update_listing(&self, listing: &Listing) -> Result<(), RepoError>;

    /// Delete scoped to the owning vendor; returns false when nothing matched.
    async fn delete_listing(&self, id: Uuid, vendor_id: Uuid) -> Result<bool, RepoError>;

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, RepoError>;

    async fn browse_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepoError>;

    async fn list_vendor_listings(&self, vendor_id: Uuid) -> Result<Vec<Listing>, RepoError>;

    async fn create_unit(&self, unit: &Unit) -> Result<(), RepoError>;

    async fn update_unit(&self, unit: &Unit) -> Result<(), RepoError>;

    async fn delete_unit(&self, id: Uuid) -> Result<(), RepoError>;

    async fn get_unit(&self, id: Uuid) -> Result<Option<Unit>, RepoError>;

    async fn list_units(&self, listing_id: Uuid) -> Result<Vec<Unit>, RepoError>;
}

/// Repository trait for the booking ledger, reviews and favorites
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a Pending booking, running the confirmed-count capacity check
    /// in the same transaction. Errors with a boxed
    /// `reserva_booking::BookingError::SlotFull` when the slot is at capacity.
    async fn create_booking(&self, booking: &Booking, capacity: i32) -> Result<(), RepoError>;

    async fn count_confirmed(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
    ) -> Result<i64, RepoError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn list_customer_bookings(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<BookingHistoryEntry>, RepoError>;

    async fn list_vendor_bookings(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<VendorBookingEntry>, RepoError>;

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<(), RepoError>;

    async fn has_review(&self, booking_id: Uuid) -> Result<bool, RepoError>;

    async fn create_review(&self, review: &Review) -> Result<(), RepoError>;

    async fn add_favorite(&self, customer_id: Uuid, unit_id: Uuid) -> Result<(), RepoError>;

    async fn remove_favorite(&self, customer_id: Uuid, unit_id: Uuid) -> Result<(), RepoError>;

    async fn list_favorites(&self, customer_id: Uuid) -> Result<Vec<FavoriteEntry>, RepoError>;

    async fn vendor_analytics(&self, vendor_id: Uuid) -> Result<Vec<ListingAnalytics>, RepoError>;
}

/// Repository trait for conversations and messages
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn get_or_create_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Conversation, RepoError>;

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, RepoError>;

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, RepoError>;

    /// Newest-first page of messages plus the total count.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Message>, i64), RepoError>;

    /// Persist a message and bump the conversation's last-message metadata
    /// and the recipient's unread counter, atomically.
    async fn create_message(&self, message: &Message, recipient_id: Uuid)
        -> Result<(), RepoError>;

    /// Mark everything the reader has not sent as read and reset their
    /// unread counter.
    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<(), RepoError>;

    async fn total_unread(&self, user_id: Uuid) -> Result<i64, RepoError>;

    async fn search_users(
        &self,
        exclude: Uuid,
        role: Option<UserRole>,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UserSummary>, RepoError>;
}
