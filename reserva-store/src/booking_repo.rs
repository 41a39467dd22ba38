use async_trait::async_trait;
use chrono::NaiveDate;
use reserva_booking::availability;
use reserva_booking::{Booking, BookingStatus, PaymentStatus, Review};
use reserva_catalog::{Unit, UnitType};
use reserva_core::repository::{
    BookingHistoryEntry, BookingRepository, FavoriteEntry, ListingAnalytics, RepoError,
    VendorBookingEntry,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: Uuid,
    listing_id: Uuid,
    unit_id: Uuid,
    booking_date: NaiveDate,
    booking_time: Option<String>,
    status: String,
    amount: i64,
    payment_status: String,
    transaction_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct BookingHistoryRow {
    id: Uuid,
    customer_id: Uuid,
    listing_id: Uuid,
    unit_id: Uuid,
    booking_date: NaiveDate,
    booking_time: Option<String>,
    status: String,
    amount: i64,
    payment_status: String,
    transaction_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    listing_name: String,
    unit_name: String,
}

#[derive(sqlx::FromRow)]
struct VendorBookingRow {
    id: Uuid,
    customer_id: Uuid,
    listing_id: Uuid,
    unit_id: Uuid,
    booking_date: NaiveDate,
    booking_time: Option<String>,
    status: String,
    amount: i64,
    payment_status: String,
    transaction_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    listing_name: String,
    unit_name: String,
    customer_name: String,
    customer_email: String,
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: Uuid,
    listing_id: Uuid,
    unit_type: String,
    name: String,
    capacity: i32,
    price: i64,
    availability: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    listing_name: String,
    listing_type: String,
    listing_image_url: String,
}

#[derive(sqlx::FromRow)]
struct AnalyticsRow {
    listing_id: Uuid,
    name: String,
    total_bookings: i64,
    total_revenue: i64,
}

fn row_to_booking(row: BookingRow) -> Result<Booking, RepoError> {
    Ok(Booking {
        id: row.id,
        customer_id: row.customer_id,
        listing_id: row.listing_id,
        unit_id: row.unit_id,
        booking_date: row.booking_date,
        booking_time: row.booking_time,
        status: BookingStatus::parse(&row.status)?,
        amount: row.amount,
        payment_status: PaymentStatus::parse(&row.payment_status)?,
        transaction_id: row.transaction_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

const BOOKING_COLUMNS: &str = "id, customer_id, listing_id, unit_id, booking_date, booking_time, status, amount, payment_status, transaction_id, created_at, updated_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, booking: &Booking, capacity: i32) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        // Count and insert share the transaction; concurrent creations can
        // still interleave, so the bound is best-effort.
        let confirmed: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE listing_id = $1 AND unit_id = $2 AND booking_date = $3
              AND booking_time IS NOT DISTINCT FROM $4
              AND status = 'CONFIRMED'
            "#,
        )
        .bind(booking.listing_id)
        .bind(booking.unit_id)
        .bind(booking.booking_date)
        .bind(booking.booking_time.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        availability::check_capacity(confirmed, capacity)?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, customer_id, listing_id, unit_id, booking_date, booking_time, status, amount, payment_status, transaction_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(booking.listing_id)
        .bind(booking.unit_id)
        .bind(booking.booking_date)
        .bind(booking.booking_time.as_deref())
        .bind(booking.status.as_str())
        .bind(booking.amount)
        .bind(booking.payment_status.as_str())
        .bind(&booking.transaction_id)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_confirmed(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
    ) -> Result<i64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE unit_id = $1 AND booking_date = $2
              AND booking_time IS NOT DISTINCT FROM $3
              AND status = 'CONFIRMED'
            "#,
        )
        .bind(unit_id)
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_booking).transpose()
    }

    async fn list_customer_bookings(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<BookingHistoryEntry>, RepoError> {
        let rows = sqlx::query_as::<_, BookingHistoryRow>(
            r#"
            SELECT b.id, b.customer_id, b.listing_id, b.unit_id, b.booking_date, b.booking_time,
                   b.status, b.amount, b.payment_status, b.transaction_id, b.created_at, b.updated_at,
                   l.name AS listing_name, u.name AS unit_name
            FROM bookings b
            JOIN listings l ON l.id = b.listing_id
            JOIN units u ON u.id = b.unit_id
            WHERE b.customer_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let listing_name = row.listing_name.clone();
                let unit_name = row.unit_name.clone();
                Ok(BookingHistoryEntry {
                    booking: row_to_booking(BookingRow {
                        id: row.id,
                        customer_id: row.customer_id,
                        listing_id: row.listing_id,
                        unit_id: row.unit_id,
                        booking_date: row.booking_date,
                        booking_time: row.booking_time,
                        status: row.status,
                        amount: row.amount,
                        payment_status: row.payment_status,
                        transaction_id: row.transaction_id,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    })?,
                    listing_name,
                    unit_name,
                })
            })
            .collect()
    }

    async fn list_vendor_bookings(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<VendorBookingEntry>, RepoError> {
        let rows = sqlx::query_as::<_, VendorBookingRow>(
            r#"
            SELECT b.id, b.customer_id, b.listing_id, b.unit_id, b.booking_date, b.booking_time,
                   b.status, b.amount, b.payment_status, b.transaction_id, b.created_at, b.updated_at,
                   l.name AS listing_name, u.name AS unit_name,
                   c.name AS customer_name, c.email AS customer_email
            FROM bookings b
            JOIN listings l ON l.id = b.listing_id
            JOIN units u ON u.id = b.unit_id
            JOIN users c ON c.id = b.customer_id
            WHERE l.vendor_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let listing_name = row.listing_name.clone();
                let unit_name = row.unit_name.clone();
                let customer_name = row.customer_name.clone();
                let customer_email = row.customer_email.clone();
                Ok(VendorBookingEntry {
                    booking: row_to_booking(BookingRow {
                        id: row.id,
                        customer_id: row.customer_id,
                        listing_id: row.listing_id,
                        unit_id: row.unit_id,
                        booking_date: row.booking_date,
                        booking_time: row.booking_time,
                        status: row.status,
                        amount: row.amount,
                        payment_status: row.payment_status,
                        transaction_id: row.transaction_id,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    })?,
                    listing_name,
                    unit_name,
                    customer_name,
                    customer_email,
                })
            })
            .collect()
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<(), RepoError> {
        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has_review(&self, booking_id: Uuid) -> Result<bool, RepoError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    async fn create_review(&self, review: &Review) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, customer_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.booking_id)
        .bind(review.customer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // Unique index on booking_id backstops racing duplicate reviews
                if let Some(db_err) = e.as_database_error() {
                    if db_err.code().as_deref() == Some("23505") {
                        return Err(Box::new(
                            reserva_booking::BookingError::AlreadyReviewed,
                        ));
                    }
                }
                Err(Box::new(e))
            }
        }
    }

    async fn add_favorite(&self, customer_id: Uuid, unit_id: Uuid) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO favorites (customer_id, unit_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (customer_id, unit_id) DO NOTHING
            "#,
        )
        .bind(customer_id)
        .bind(unit_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_favorite(&self, customer_id: Uuid, unit_id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM favorites WHERE customer_id = $1 AND unit_id = $2")
            .bind(customer_id)
            .bind(unit_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_favorites(&self, customer_id: Uuid) -> Result<Vec<FavoriteEntry>, RepoError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT u.id, u.listing_id, u.unit_type, u.name, u.capacity, u.price, u.availability,
                   u.created_at, u.updated_at,
                   l.name AS listing_name, l.listing_type, l.image_url AS listing_image_url
            FROM favorites f
            JOIN units u ON u.id = f.unit_id
            JOIN listings l ON l.id = u.listing_id
            WHERE f.customer_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(FavoriteEntry {
                    unit: Unit {
                        id: row.id,
                        listing_id: row.listing_id,
                        unit_type: UnitType::parse(&row.unit_type)?,
                        name: row.name,
                        capacity: row.capacity,
                        price: row.price,
                        availability: row.availability,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                    listing_name: row.listing_name,
                    listing_type: row.listing_type,
                    listing_image_url: row.listing_image_url,
                })
            })
            .collect()
    }

    async fn vendor_analytics(&self, vendor_id: Uuid) -> Result<Vec<ListingAnalytics>, RepoError> {
        let rows = sqlx::query_as::<_, AnalyticsRow>(
            r#"
            SELECT l.id AS listing_id, l.name,
                   COUNT(b.id) FILTER (WHERE b.status = 'COMPLETED') AS total_bookings,
                   COALESCE(SUM(b.amount) FILTER (WHERE b.status = 'COMPLETED'), 0)::BIGINT AS total_revenue
            FROM listings l
            LEFT JOIN bookings b ON b.listing_id = l.id
            WHERE l.vendor_id = $1
            GROUP BY l.id, l.name
            ORDER BY l.name
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ListingAnalytics {
                listing_id: row.listing_id,
                name: row.name,
                total_bookings: row.total_bookings,
                total_revenue: row.total_revenue,
            })
            .collect())
    }
}
