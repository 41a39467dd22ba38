use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// One bookable slot of a unit. Hotel rooms book whole dates, restaurant
/// tables book a time within the date.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Slot {
    pub unit_id: Uuid,
    pub date: NaiveDate,
    pub time: Option<String>,
}

impl Slot {
    pub fn new(unit_id: Uuid, date: NaiveDate, time: Option<&str>) -> Self {
        Self {
            unit_id,
            date,
            time: time.map(str::to_owned),
        }
    }
}

/// In-memory occupancy tracker mirroring the store-side confirmed-count
/// semantics: a slot holds at most `capacity` confirmed bookings.
pub struct UnitInventory {
    capacities: HashMap<Uuid, i32>,
    confirmed: HashMap<Slot, i32>,
}

impl UnitInventory {
    pub fn new() -> Self {
        Self {
            capacities: HashMap::new(),
            confirmed: HashMap::new(),
        }
    }

    /// Register a unit and its capacity before tracking its slots.
    pub fn register_unit(&mut self, unit_id: Uuid, capacity: i32) {
        self.capacities.insert(unit_id, capacity);
    }

    /// Confirmed count currently held against a slot.
    pub fn confirmed(&self, slot: &Slot) -> i32 {
        self.confirmed.get(slot).copied().unwrap_or(0)
    }

    pub fn remaining(&self, slot: &Slot) -> Option<i32> {
        self.capacities
            .get(&slot.unit_id)
            .map(|capacity| capacity - self.confirmed(slot))
    }

    /// Record a confirmation against a slot, rejecting once capacity is hit.
    pub fn record_confirmed(&mut self, slot: Slot) -> Result<i32, InventoryError> {
        let capacity = *self
            .capacities
            .get(&slot.unit_id)
            .ok_or(InventoryError::UnknownUnit(slot.unit_id))?;

        let booked = self.confirmed(&slot);
        if booked >= capacity {
            return Err(InventoryError::SlotFull { booked, capacity });
        }

        let count = self.confirmed.entry(slot).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Release one confirmation, e.g. when a vendor cancels.
    pub fn release_confirmed(&mut self, slot: &Slot) -> Result<i32, InventoryError> {
        if !self.capacities.contains_key(&slot.unit_id) {
            return Err(InventoryError::UnknownUnit(slot.unit_id));
        }

        match self.confirmed.get_mut(slot) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(*count)
            }
            _ => Ok(0),
        }
    }
}

impl Default for UnitInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Unit not registered: {0}")]
    UnknownUnit(Uuid),

    #[error("Slot full: {booked} confirmed of capacity {capacity}")]
    SlotFull { booked: i32, capacity: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(unit_id: Uuid, time: Option<&str>) -> Slot {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        Slot::new(unit_id, date, time)
    }

    #[test]
    fn test_slot_fills_to_capacity() {
        let mut inventory = UnitInventory::new();
        let table = Uuid::new_v4();
        inventory.register_unit(table, 2);

        inventory.record_confirmed(slot(table, Some("19:30"))).unwrap();
        inventory.record_confirmed(slot(table, Some("19:30"))).unwrap();

        let err = inventory
            .record_confirmed(slot(table, Some("19:30")))
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::SlotFull {
                booked: 2,
                capacity: 2
            }
        ));

        // A different time on the same date is a separate slot.
        assert!(inventory.record_confirmed(slot(table, Some("21:00"))).is_ok());
    }

    #[test]
    fn test_release_frees_a_seat() {
        let mut inventory = UnitInventory::new();
        let room = Uuid::new_v4();
        inventory.register_unit(room, 1);

        inventory.record_confirmed(slot(room, None)).unwrap();
        assert_eq!(inventory.remaining(&slot(room, None)), Some(0));

        inventory.release_confirmed(&slot(room, None)).unwrap();
        assert_eq!(inventory.remaining(&slot(room, None)), Some(1));
        assert!(inventory.record_confirmed(slot(room, None)).is_ok());
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let mut inventory = UnitInventory::new();
        let err = inventory
            .record_confirmed(slot(Uuid::new_v4(), None))
            .unwrap_err();
        assert!(matches!(err, InventoryError::UnknownUnit(_)));
    }
}
