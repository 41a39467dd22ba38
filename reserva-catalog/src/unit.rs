use crate::listing::CatalogError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of individually reservable units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Room,
    Table,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Room => "ROOM",
            UnitType::Table => "TABLE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        match s {
            "ROOM" => Ok(UnitType::Room),
            "TABLE" => Ok(UnitType::Table),
            other => Err(CatalogError::UnknownUnitType(other.to_string())),
        }
    }
}

/// A room or table inside a listing. Capacity bounds how many confirmed
/// bookings may share one (date, time) slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub unit_type: UnitType,
    pub name: String,
    pub capacity: i32,
    pub price: i64,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(
        listing_id: Uuid,
        unit_type: UnitType,
        name: String,
        capacity: i32,
        price: i64,
    ) -> Result<Self, CatalogError> {
        if name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        if capacity <= 0 {
            return Err(CatalogError::InvalidCapacity(capacity));
        }
        if price < 0 {
            return Err(CatalogError::InvalidPrice(price));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            listing_id,
            unit_type,
            name,
            capacity,
            price,
            availability: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Vendors can pull a unit from sale without deleting it.
    pub fn is_bookable(&self) -> bool {
        self.availability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_starts_available() {
        let unit = Unit::new(
            Uuid::new_v4(),
            UnitType::Table,
            "Window table".to_string(),
            4,
            2500,
        )
        .unwrap();

        assert!(unit.is_bookable());
        assert_eq!(unit.capacity, 4);
    }

    #[test]
    fn test_rejects_nonpositive_capacity() {
        let result = Unit::new(Uuid::new_v4(), UnitType::Room, "101".to_string(), 0, 100);
        assert!(matches!(result, Err(CatalogError::InvalidCapacity(0))));
    }
}
