//! Equipment refuel entry model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One equipment refueling record appended to an open shift
///
/// Entries form an append-only ledger: once the server has accepted an
/// entry it is never mutated, corrections go in as new entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefuelEntry {
    pub id: Option<i64>,
    /// Refueled equipment ID
    pub equipment_id: i64,
    /// Equipment display name
    pub equipment_name: String,
    /// Fleet asset code (plate / internal tag)
    pub asset_code: Option<String>,
    /// Litres dispensed, always positive
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Odometer / hour-meter snapshot at refuel time
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub meter_reading: Option<Decimal>,
    /// Attestation by whoever received the fuel
    pub sign_off: Option<String>,
}

impl From<RefuelEntryDraft> for RefuelEntry {
    /// Local representation of a draft the server has acked but not yet
    /// echoed back; the id stays unset until the next full reload.
    fn from(draft: RefuelEntryDraft) -> Self {
        Self {
            id: None,
            equipment_id: draft.equipment_id,
            equipment_name: draft.equipment_name,
            asset_code: draft.asset_code,
            quantity: draft.quantity,
            meter_reading: draft.meter_reading,
            sign_off: draft.sign_off,
        }
    }
}

/// Refuel entry payload (add entries to an open shift)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefuelEntryDraft {
    /// Refueled equipment ID
    pub equipment_id: i64,
    /// Equipment display name
    pub equipment_name: String,
    /// Fleet asset code (plate / internal tag)
    pub asset_code: Option<String>,
    /// Litres dispensed, must be positive
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Odometer / hour-meter snapshot at refuel time
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub meter_reading: Option<Decimal>,
    /// Attestation by whoever received the fuel
    pub sign_off: Option<String>,
}
