use serde::{Deserialize, Serialize};

use super::Cents;

/// Store-assigned row id (SQLite AUTOINCREMENT).
pub type VehicleId = i64;

/// A vehicle in the fleet. Rows are created by provisioning (`fleet add`);
/// the ledger only ever flips `is_available` as a rental opens or closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub brand: String,
    pub model: String,
    /// Daily rate in cents, never negative.
    pub rate_per_day: Cents,
    /// False exactly while the vehicle is out on an open rental.
    pub is_available: bool,
}

impl Vehicle {
    /// Display label, e.g. "Toyota Corolla".
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
