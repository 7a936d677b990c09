//! Shift model (fuel shift lifecycle)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::refuel_entry::RefuelEntry;

/// Fuel shift record - one fueling session, exclusive system-wide
///
/// The backend enforces that at most one shift is open at a time.
/// A shift is open while `closing_stock` is `None`; once the close is
/// accepted the closing stock is fixed and no further entries are taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Option<i64>,
    /// Opening date (ISO 8601)
    pub opened_at: String,
    /// Tank stock declared at open time (litres)
    #[serde(with = "rust_decimal::serde::float")]
    pub starting_stock: Decimal,
    /// Fuel received into the tank during the shift (litres)
    #[serde(with = "rust_decimal::serde::float")]
    pub fuel_intake: Decimal,
    /// Station / pump identifier
    pub station: Option<String>,
    /// Pump operator display name
    pub operator_name: String,
    /// Supervisor responsible for the shift
    pub responsible_name: String,
    /// Stock counted at close, `None` while the shift is open
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub closing_stock: Option<Decimal>,
    /// Refuel entries in recording order
    #[serde(default)]
    pub entries: Vec<RefuelEntry>,
}

impl Shift {
    /// A shift is open until the backend has fixed its closing stock.
    pub fn is_open(&self) -> bool {
        self.closing_stock.is_none()
    }

    /// Total litres dispensed across all recorded entries.
    pub fn total_dispensed(&self) -> Decimal {
        self.entries.iter().map(|e| e.quantity).sum()
    }
}

/// Start shift payload (open shift)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStart {
    /// Tank stock at open time (litres), must be positive
    #[serde(with = "rust_decimal::serde::float")]
    pub starting_stock: Decimal,
    /// Fuel received at open time (litres)
    #[serde(default, with = "rust_decimal::serde::float")]
    pub fuel_intake: Decimal,
    /// Station / pump identifier
    pub station: Option<String>,
    /// Pump operator display name
    pub operator_name: String,
    /// Supervisor responsible for the shift, must be non-empty
    pub responsible_name: String,
}

/// Close shift payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftClose {
    /// Stock counted in the tank at close (litres), must be positive
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_stock: Decimal,
}
