use crate::unit::UnitType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of bookable properties in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    Hotel,
    Restaurant,
}

impl ListingType {
    /// Units inside a restaurant are tables, everything else rents rooms.
    pub fn unit_type(&self) -> UnitType {
        match self {
            ListingType::Restaurant => UnitType::Table,
            ListingType::Hotel => UnitType::Room,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Hotel => "HOTEL",
            ListingType::Restaurant => "RESTAURANT",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        match s {
            "HOTEL" => Ok(ListingType::Hotel),
            "RESTAURANT" => Ok(ListingType::Restaurant),
            other => Err(CatalogError::UnknownListingType(other.to_string())),
        }
    }
}

/// A vendor-owned property customers can book units of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub listing_type: ListingType,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub facilities: String,
    pub base_price: i64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vendor_id: Uuid,
        listing_type: ListingType,
        name: String,
        address: String,
        description: Option<String>,
        facilities: String,
        base_price: i64,
        image_url: String,
    ) -> Result<Self, CatalogError> {
        if name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        if address.trim().is_empty() {
            return Err(CatalogError::MissingField("address"));
        }
        if facilities.trim().is_empty() {
            return Err(CatalogError::MissingField("facilities"));
        }
        if base_price < 0 {
            return Err(CatalogError::InvalidPrice(base_price));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            vendor_id,
            listing_type,
            name,
            address,
            description,
            facilities,
            base_price,
            image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Only the owning vendor may mutate a listing or anything under it.
    pub fn authorize_vendor(&self, vendor_id: Uuid) -> Result<(), CatalogError> {
        if self.vendor_id != vendor_id {
            return Err(CatalogError::NotListingVendor {
                listing_id: self.id,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Listing not found: {0}")]
    ListingNotFound(Uuid),

    #[error("Unit not found: {0}")]
    UnitNotFound(Uuid),

    #[error("Only the vendor owning listing {listing_id} may perform this action")]
    NotListingVendor { listing_id: Uuid },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Price must not be negative, got {0}")]
    InvalidPrice(i64),

    #[error("Capacity must be positive, got {0}")]
    InvalidCapacity(i32),

    #[error("Unknown listing type: {0}")]
    UnknownListingType(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing(vendor_id: Uuid) -> Listing {
        Listing::new(
            vendor_id,
            ListingType::Restaurant,
            "Trattoria Nonna".to_string(),
            "12 Via Roma".to_string(),
            None,
            "wifi,terrace".to_string(),
            4500,
            "https://media.example.com/nonna.jpg".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_unit_type_follows_listing_type() {
        assert_eq!(ListingType::Restaurant.unit_type(), UnitType::Table);
        assert_eq!(ListingType::Hotel.unit_type(), UnitType::Room);
    }

    #[test]
    fn test_vendor_authorization() {
        let vendor = Uuid::new_v4();
        let listing = sample_listing(vendor);

        assert!(listing.authorize_vendor(vendor).is_ok());
        assert!(listing.authorize_vendor(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_rejects_blank_fields() {
        let result = Listing::new(
            Uuid::new_v4(),
            ListingType::Hotel,
            "  ".to_string(),
            "1 Main St".to_string(),
            None,
            "parking".to_string(),
            100,
            String::new(),
        );
        assert!(matches!(result, Err(CatalogError::MissingField("name"))));
    }
}
