//! Data models
//!
//! Shared between the console client and the backend API.
//! Quantities are litres as `rust_decimal::Decimal`; the wire format is
//! camelCase JSON with decimals serialized as numbers.

pub mod refuel_entry;
pub mod shift;

// Re-exports
pub use refuel_entry::*;
pub use shift::*;
