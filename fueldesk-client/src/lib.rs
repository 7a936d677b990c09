//! Fueldesk Client - fuel shift lifecycle client for the maintenance backend
//!
//! Provides the shift lifecycle coordinator and the REST transport it
//! drives: verify the locally cached shift pointer, start a shift,
//! record equipment refuel entries, close with reconciliation. The
//! backend enforces that at most one shift is open at a time; this crate
//! only discovers that, recovering from the conflict message embedded in
//! a rejected start.

pub mod api;
pub mod config;
pub mod conflict;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod pointer;
pub mod reconcile;

pub use api::{HttpShiftApi, ShiftApi};
pub use config::ClientConfig;
pub use conflict::extract_shift_id;
pub use coordinator::{AddEntriesOutcome, CoordinatorError, ShiftCoordinator, ShiftState};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};
pub use pointer::{PointerCacheError, ShiftPointerCache};
pub use reconcile::ReconciliationResult;

// Re-export shared types for convenience
pub use shared::models::{RefuelEntry, RefuelEntryDraft, Shift, ShiftClose, ShiftStart};
