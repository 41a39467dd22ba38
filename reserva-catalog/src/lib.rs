pub mod inventory;
pub mod listing;
pub mod unit;

pub use inventory::UnitInventory;
pub use listing::{Listing, ListingType};
pub use unit::{Unit, UnitType};
