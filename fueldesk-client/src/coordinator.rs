//! Fuel shift lifecycle coordinator
//!
//! The state machine behind the console's shift screen: verify the
//! cached pointer against the server, start a shift, record equipment
//! refuel entries, close with reconciliation. The backend enforces the
//! real exclusivity invariant (at most one open shift); this coordinator
//! only discovers it, recovering from the conflict message when a start
//! is rejected.
//!
//! All recoverable situations (conflict with a parsable id, stale
//! pointer) are resolved here; callers only ever observe a new definite
//! state or an already-classified error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;

use shared::models::{RefuelEntry, RefuelEntryDraft, Shift, ShiftClose, ShiftStart};

use crate::api::ShiftApi;
use crate::conflict::extract_shift_id;
use crate::error::ClientError;
use crate::pointer::ShiftPointerCache;
use crate::reconcile::{self, ReconciliationResult};

/// Repeated verify triggers inside this window collapse to a no-op.
pub const VERIFY_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Coordinator state - an explicit tagged union of the real state
/// space, so illegal combinations (entries without a shift, closing
/// stock on an open shift) are unrepresentable.
#[derive(Debug, Clone)]
pub enum ShiftState {
    /// Nothing known yet; no verification has run
    Unknown,
    /// A verification round trip is in flight
    Verifying,
    /// No shift is open as far as the client knows
    NoOpenShift,
    /// An open shift, entries populated from the server
    Open(Shift),
    /// A closed shift carrying the final reconciliation
    Closed {
        shift: Shift,
        reconciliation: ReconciliationResult,
    },
}

impl ShiftState {
    /// The open shift, when there is one
    pub fn open_shift(&self) -> Option<&Shift> {
        match self {
            ShiftState::Open(shift) => Some(shift),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ShiftState::Open(_))
    }
}

/// Outcome of an add-entries call
#[derive(Debug, Clone)]
pub enum AddEntriesOutcome {
    /// Entries acked by the server and appended locally
    Recorded(Shift),
    /// The shift vanished under us (closed elsewhere). Pointer cleared
    /// and state reloaded - an informational notice, not an error.
    StaleStateReloaded,
}

/// Coordinator errors - every variant is already classified; raw
/// transport or HTTP errors never reach the caller.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Fail-fast local validation, or a server-side 400 surfaced
    /// verbatim. No state transition occurred.
    #[error("{0}")]
    Validation(String),

    /// A shift is already open but neither the conflict message nor a
    /// follow-up fetch could recover it
    #[error("A shift is already open but could not be recovered: {0}")]
    UnrecoverableConflict(String),

    /// Transport failure; the user must re-trigger
    #[error("Connection error: {0}")]
    Connection(String),

    /// Another lifecycle operation is already in flight
    #[error("Another shift operation is in progress")]
    Busy,

    /// The operation requires an open shift
    #[error("No open shift")]
    NoOpenShift,

    /// Unknown/other failure; state left unchanged
    #[error("Shift API error: {0}")]
    Api(String),
}

impl From<ClientError> for CoordinatorError {
    fn from(err: ClientError) -> Self {
        if err.is_connection() {
            return CoordinatorError::Connection(err.to_string());
        }
        match err {
            ClientError::Validation(msg) => CoordinatorError::Validation(msg),
            other => CoordinatorError::Api(other.to_string()),
        }
    }
}

/// Resets the in-flight flag when the operation finishes, on every
/// return path.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fuel shift lifecycle coordinator
pub struct ShiftCoordinator {
    api: Arc<dyn ShiftApi>,
    cache: ShiftPointerCache,
    state: RwLock<ShiftState>,
    in_flight: AtomicBool,
    last_verified: std::sync::Mutex<Option<Instant>>,
}

impl ShiftCoordinator {
    pub fn new(api: Arc<dyn ShiftApi>, cache: ShiftPointerCache) -> Self {
        Self {
            api,
            cache,
            state: RwLock::new(ShiftState::Unknown),
            in_flight: AtomicBool::new(false),
            last_verified: std::sync::Mutex::new(None),
        }
    }

    /// Current state snapshot
    pub async fn state(&self) -> ShiftState {
        self.state.read().await.clone()
    }

    /// Reconcile the cached pointer with the server.
    ///
    /// Debounced: a verification completed within [`VERIFY_DEBOUNCE`]
    /// (unless `force`), or one currently in flight, short-circuits to
    /// the current state without a network call. No speculative
    /// discovery happens here - without a pointer the answer is
    /// `NoOpenShift` straight away; discovery-by-conflict only happens
    /// as a side effect of an actual start attempt.
    pub async fn verify(&self, force: bool) -> Result<ShiftState, CoordinatorError> {
        if !force && self.recently_verified() {
            return Ok(self.state().await);
        }
        let Some(_guard) = self.try_begin() else {
            // A lifecycle operation is in flight; collapse to its result.
            return Ok(self.state().await);
        };

        let result = self.verify_inner().await;
        if result.is_ok() {
            self.mark_verified();
        }
        result
    }

    /// Start a new shift. Allowed from any state except `Open`; an
    /// explicit user action, never an automatic re-open.
    pub async fn start_shift(&self, params: ShiftStart) -> Result<ShiftState, CoordinatorError> {
        validate_start(&params)?;
        let _guard = self.try_begin().ok_or(CoordinatorError::Busy)?;

        if self.state.read().await.is_open() {
            return Err(CoordinatorError::Validation(
                "a shift is already open".to_string(),
            ));
        }

        match self.api.start_shift(&params).await {
            Ok(shift) => {
                if let Some(id) = shift.id {
                    self.store_pointer(id);
                }
                tracing::info!(shift_id = ?shift.id, "shift started");
                Ok(self.transition(ShiftState::Open(shift)).await)
            }
            Err(ClientError::OpenShiftConflict(message)) => {
                self.recover_from_conflict(message).await
            }
            // Fail-safe: no state transition on errors we don't understand.
            Err(e) => Err(e.into()),
        }
    }

    /// Record refuel entries against the open shift.
    ///
    /// No optimistic append: entries join the in-memory list only after
    /// the server acks them. A NotFound answer means the shift was
    /// closed elsewhere - the pointer is evicted and the state reloaded,
    /// surfaced as a notice rather than an error.
    pub async fn add_entries(
        &self,
        drafts: Vec<RefuelEntryDraft>,
    ) -> Result<AddEntriesOutcome, CoordinatorError> {
        validate_entries(&drafts)?;
        let _guard = self.try_begin().ok_or(CoordinatorError::Busy)?;

        let shift_id = match self.state.read().await.open_shift() {
            Some(shift) => shift
                .id
                .ok_or_else(|| CoordinatorError::Api("open shift has no id".to_string()))?,
            None => return Err(CoordinatorError::NoOpenShift),
        };

        match self.api.add_entries(shift_id, &drafts).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                let ShiftState::Open(shift) = &mut *state else {
                    // State cannot have changed while we held the guard.
                    return Err(CoordinatorError::NoOpenShift);
                };
                shift
                    .entries
                    .extend(drafts.into_iter().map(RefuelEntry::from));
                tracing::debug!(
                    shift_id,
                    entries = shift.entries.len(),
                    "refuel entries recorded"
                );
                Ok(AddEntriesOutcome::Recorded(shift.clone()))
            }
            Err(ClientError::NotFound(_)) => {
                tracing::warn!(shift_id, "shift vanished while adding entries, reloading");
                self.evict_pointer();
                self.verify_inner().await?;
                self.mark_verified();
                Ok(AddEntriesOutcome::StaleStateReloaded)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close the open shift with the counted stock. Variance between
    /// declared and expected stock is computed and carried in the final
    /// state, but never blocks the close.
    pub async fn close_shift(&self, params: ShiftClose) -> Result<ShiftState, CoordinatorError> {
        validate_close(&params)?;
        let _guard = self.try_begin().ok_or(CoordinatorError::Busy)?;

        let open = match self.state.read().await.open_shift() {
            Some(shift) => shift.clone(),
            None => return Err(CoordinatorError::NoOpenShift),
        };
        let shift_id = open
            .id
            .ok_or_else(|| CoordinatorError::Api("open shift has no id".to_string()))?;

        match self.api.close_shift(shift_id, &params).await {
            Ok(echo) => {
                // Closed shifts are never cached as open.
                self.evict_pointer();

                let mut shift = open;
                if !echo.entries.is_empty() {
                    shift.entries = echo.entries;
                }
                shift.closing_stock = echo.closing_stock.or(Some(params.closing_stock));

                let declared = shift.closing_stock.unwrap_or(params.closing_stock);
                let reconciliation = reconcile::reconcile(&shift, declared);
                tracing::info!(
                    shift_id,
                    expected = %reconciliation.expected_closing,
                    variance = %reconciliation.variance,
                    "shift closed"
                );
                Ok(self
                    .transition(ShiftState::Closed {
                        shift,
                        reconciliation,
                    })
                    .await)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ==================== internals ====================

    /// Pointer-driven re-sync against the server. Caller holds the
    /// flight guard.
    async fn verify_inner(&self) -> Result<ShiftState, CoordinatorError> {
        self.transition(ShiftState::Verifying).await;

        let pointer = match self.cache.get() {
            Ok(p) => p,
            Err(e) => {
                // The pointer is a hint; losing it costs a round trip,
                // not correctness.
                tracing::warn!("pointer cache read failed: {e}");
                None
            }
        };

        let next = match pointer {
            None => ShiftState::NoOpenShift,
            Some(id) => match self.api.get_shift(id).await {
                Ok(shift) if shift.is_open() => {
                    tracing::info!(shift_id = id, "verified open shift");
                    ShiftState::Open(shift)
                }
                Ok(_) => {
                    tracing::info!(shift_id = id, "cached shift already closed, evicting pointer");
                    self.evict_pointer();
                    ShiftState::NoOpenShift
                }
                Err(ClientError::NotFound(_)) => {
                    tracing::info!(shift_id = id, "cached shift pointer is stale, evicting");
                    self.evict_pointer();
                    ShiftState::NoOpenShift
                }
                Err(e) => {
                    // Verification failed outright; we know nothing.
                    self.transition(ShiftState::Unknown).await;
                    return Err(e.into());
                }
            },
        };
        Ok(self.transition(next).await)
    }

    /// Recovery path for a rejected start: parse the id out of the
    /// message, cache it, and fetch the real shift - the parsed id alone
    /// is never trusted as shift content.
    async fn recover_from_conflict(
        &self,
        message: String,
    ) -> Result<ShiftState, CoordinatorError> {
        let Some(id) = extract_shift_id(&message) else {
            tracing::warn!("conflict message carried no shift id: {message}");
            self.transition(ShiftState::NoOpenShift).await;
            return Err(CoordinatorError::UnrecoverableConflict(message));
        };

        tracing::info!(shift_id = id, "start conflicted with an open shift, recovering");
        self.store_pointer(id);

        match self.api.get_shift(id).await {
            Ok(shift) if shift.is_open() => Ok(self.transition(ShiftState::Open(shift)).await),
            Ok(_) => {
                // Closed between the conflict and our fetch.
                self.evict_pointer();
                Ok(self.transition(ShiftState::NoOpenShift).await)
            }
            Err(e) => {
                if matches!(e, ClientError::NotFound(_)) {
                    self.evict_pointer();
                }
                self.transition(ShiftState::NoOpenShift).await;
                Err(CoordinatorError::UnrecoverableConflict(format!(
                    "fetch of conflicting shift {} failed: {}",
                    id, e
                )))
            }
        }
    }

    async fn transition(&self, next: ShiftState) -> ShiftState {
        let mut state = self.state.write().await;
        *state = next;
        state.clone()
    }

    /// Acquire the single-flight guard; `None` when an operation is
    /// already in flight.
    fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightGuard(&self.in_flight))
    }

    fn recently_verified(&self) -> bool {
        self.last_verified
            .lock()
            .map(|last| last.is_some_and(|t| t.elapsed() < VERIFY_DEBOUNCE))
            .unwrap_or(false)
    }

    fn mark_verified(&self) {
        if let Ok(mut last) = self.last_verified.lock() {
            *last = Some(Instant::now());
        }
    }

    fn store_pointer(&self, id: i64) {
        if let Err(e) = self.cache.set(id) {
            tracing::warn!(shift_id = id, "pointer cache write failed: {e}");
        }
    }

    fn evict_pointer(&self) {
        if let Err(e) = self.cache.clear() {
            tracing::warn!("pointer cache clear failed: {e}");
        }
    }
}

// ==================== fail-fast validation ====================
// Performed before any network call; no partial requests.

fn validate_start(params: &ShiftStart) -> Result<(), CoordinatorError> {
    if params.starting_stock <= Decimal::ZERO {
        return Err(CoordinatorError::Validation(
            "starting stock must be positive".to_string(),
        ));
    }
    if params.fuel_intake < Decimal::ZERO {
        return Err(CoordinatorError::Validation(
            "fuel intake must be non-negative".to_string(),
        ));
    }
    if params.responsible_name.trim().is_empty() {
        return Err(CoordinatorError::Validation(
            "responsible name is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_entries(drafts: &[RefuelEntryDraft]) -> Result<(), CoordinatorError> {
    if drafts.is_empty() {
        return Err(CoordinatorError::Validation(
            "no entries to record".to_string(),
        ));
    }
    for draft in drafts {
        if draft.equipment_id <= 0 {
            return Err(CoordinatorError::Validation(
                "equipment must be selected".to_string(),
            ));
        }
        if draft.quantity <= Decimal::ZERO {
            return Err(CoordinatorError::Validation(
                "quantity must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_close(params: &ShiftClose) -> Result<(), CoordinatorError> {
    if params.closing_stock <= Decimal::ZERO {
        return Err(CoordinatorError::Validation(
            "closing stock must be positive".to_string(),
        ));
    }
    Ok(())
}
