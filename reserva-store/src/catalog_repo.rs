use async_trait::async_trait;
use reserva_catalog::{Listing, ListingType, Unit, UnitType};
use reserva_core::repository::{CatalogRepository, ListingFilter, RepoError};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    vendor_id: Uuid,
    listing_type: String,
    name: String,
    address: String,
    description: Option<String>,
    facilities: String,
    base_price: i64,
    image_url: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: Uuid,
    listing_id: Uuid,
    unit_type: String,
    name: String,
    capacity: i32,
    price: i64,
    availability: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn row_to_listing(row: ListingRow) -> Result<Listing, RepoError> {
    Ok(Listing {
        id: row.id,
        vendor_id: row.vendor_id,
        listing_type: ListingType::parse(&row.listing_type)?,
        name: row.name,
        address: row.address,
        description: row.description,
        facilities: row.facilities,
        base_price: row.base_price,
        image_url: row.image_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_unit(row: UnitRow) -> Result<Unit, RepoError> {
    Ok(Unit {
        id: row.id,
        listing_id: row.listing_id,
        unit_type: UnitType::parse(&row.unit_type)?,
        name: row.name,
        capacity: row.capacity,
        price: row.price,
        availability: row.availability,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

const LISTING_COLUMNS: &str = "id, vendor_id, listing_type, name, address, description, facilities, base_price, image_url, created_at, updated_at";
const UNIT_COLUMNS: &str =
    "id, listing_id, unit_type, name, capacity, price, availability, created_at, updated_at";

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_listing(&self, listing: &Listing) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, vendor_id, listing_type, name, address, description, facilities, base_price, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(listing.id)
        .bind(listing.vendor_id)
        .bind(listing.listing_type.as_str())
        .bind(&listing.name)
        .bind(&listing.address)
        .bind(&listing.description)
        .bind(&listing.facilities)
        .bind(listing.base_price)
        .bind(&listing.image_url)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_listing(&self, listing: &Listing) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE listings
            SET name = $2, address = $3, description = $4, facilities = $5,
                base_price = $6, listing_type = $7, image_url = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.name)
        .bind(&listing.address)
        .bind(&listing.description)
        .bind(&listing.facilities)
        .bind(listing.base_price)
        .bind(listing.listing_type.as_str())
        .bind(&listing.image_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_listing(&self, id: Uuid, vendor_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1 AND vendor_id = $2")
            .bind(id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, RepoError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE id = $1",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_listing).transpose()
    }

    async fn browse_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepoError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            SELECT {}
            FROM listings
            WHERE ($1::TEXT IS NULL OR listing_type = $1)
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%' OR address ILIKE '%' || $2 || '%')
              AND ($3::BIGINT IS NULL OR base_price <= $3)
            ORDER BY created_at DESC
            "#,
            LISTING_COLUMNS
        ))
        .bind(&filter.listing_type)
        .bind(&filter.search)
        .bind(filter.max_price)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_listing).collect()
    }

    async fn list_vendor_listings(&self, vendor_id: Uuid) -> Result<Vec<Listing>, RepoError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE vendor_id = $1 ORDER BY created_at DESC",
            LISTING_COLUMNS
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_listing).collect()
    }

    async fn create_unit(&self, unit: &Unit) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO units (id, listing_id, unit_type, name, capacity, price, availability, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(unit.id)
        .bind(unit.listing_id)
        .bind(unit.unit_type.as_str())
        .bind(&unit.name)
        .bind(unit.capacity)
        .bind(unit.price)
        .bind(unit.availability)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_unit(&self, unit: &Unit) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE units
            SET name = $2, capacity = $3, price = $4, availability = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(unit.id)
        .bind(&unit.name)
        .bind(unit.capacity)
        .bind(unit.price)
        .bind(unit.availability)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_unit(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_unit(&self, id: Uuid) -> Result<Option<Unit>, RepoError> {
        let row = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {} FROM units WHERE id = $1",
            UNIT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_unit).transpose()
    }

    async fn list_units(&self, listing_id: Uuid) -> Result<Vec<Unit>, RepoError> {
        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {} FROM units WHERE listing_id = $1 ORDER BY created_at",
            UNIT_COLUMNS
        ))
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_unit).collect()
    }
}
