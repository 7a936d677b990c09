//! Shared types for the fueldesk console
//!
//! Wire models exchanged with the maintenance backend REST API.
//! All IDs are `i64` (server-assigned), timestamps are ISO 8601 strings.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
