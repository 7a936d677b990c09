//! Shift API endpoints
//!
//! Thin per-endpoint wrappers over the generic HTTP verbs, plus the
//! conflict classification: the backend signals "a shift is already
//! open" only as a 400 whose message contains a known phrase. Matching
//! lives here, behind the [`ShiftApi`] trait, so a structured error
//! field can replace it later without touching the state machine.

use async_trait::async_trait;

use shared::models::{RefuelEntryDraft, Shift, ShiftClose, ShiftStart};

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

/// Phrases embedded in the 400 returned when a start hits an
/// already-open shift. The wording is the only structured signal.
const CONFLICT_PHRASES: &[&str] = &["turno em aberto", "open shift"];

/// Wording of the 400 returned when entries land after the shift was
/// closed elsewhere. Remapped to NotFound so the stale-state path
/// covers both signals.
const NO_OPEN_SHIFT_PHRASES: &[&str] = &["não há turno aberto", "no open shift"];

fn message_matches(message: &str, phrases: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    phrases.iter().any(|p| lowered.contains(p))
}

/// Shift API consumed by the coordinator
#[async_trait]
pub trait ShiftApi: Send + Sync {
    /// Start a new shift. Fails with [`ClientError::OpenShiftConflict`]
    /// when the backend already has one open.
    async fn start_shift(&self, params: &ShiftStart) -> ClientResult<Shift>;

    /// Append refuel entries to an open shift. The backend only acks;
    /// it does not echo the shift.
    async fn add_entries(&self, shift_id: i64, entries: &[RefuelEntryDraft]) -> ClientResult<()>;

    /// Fetch a shift by id.
    async fn get_shift(&self, shift_id: i64) -> ClientResult<Shift>;

    /// Close an open shift with the counted stock.
    async fn close_shift(&self, shift_id: i64, params: &ShiftClose) -> ClientResult<Shift>;
}

/// HTTP-backed shift API
#[derive(Debug, Clone)]
pub struct HttpShiftApi<C: HttpClient> {
    http: C,
}

impl<C: HttpClient> HttpShiftApi<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }
}

#[async_trait]
impl<C: HttpClient> ShiftApi for HttpShiftApi<C> {
    async fn start_shift(&self, params: &ShiftStart) -> ClientResult<Shift> {
        match self.http.post::<Shift, _>("/api/shifts", params).await {
            Err(ClientError::Validation(msg)) if message_matches(&msg, CONFLICT_PHRASES) => {
                Err(ClientError::OpenShiftConflict(msg))
            }
            other => other,
        }
    }

    async fn add_entries(&self, shift_id: i64, entries: &[RefuelEntryDraft]) -> ClientResult<()> {
        let path = format!("/api/shifts/{}/entries", shift_id);
        match self
            .http
            .put::<serde_json::Value, _>(&path, &entries)
            .await
        {
            Ok(_ack) => Ok(()),
            Err(ClientError::Validation(msg)) if message_matches(&msg, NO_OPEN_SHIFT_PHRASES) => {
                Err(ClientError::NotFound(msg))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_shift(&self, shift_id: i64) -> ClientResult<Shift> {
        self.http
            .get::<Shift>(&format!("/api/shifts/{}", shift_id))
            .await
    }

    async fn close_shift(&self, shift_id: i64, params: &ShiftClose) -> ClientResult<Shift> {
        self.http
            .put::<Shift, _>(&format!("/api/shifts/{}/close", shift_id), params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_phrase_matching_is_case_insensitive() {
        assert!(message_matches(
            "Existe um Turno em Aberto (ID: 42)",
            CONFLICT_PHRASES
        ));
        assert!(message_matches(
            "There is an OPEN SHIFT already",
            CONFLICT_PHRASES
        ));
        assert!(!message_matches("quantity must be positive", CONFLICT_PHRASES));
    }

    #[test]
    fn no_open_shift_phrase_is_distinct_from_conflict() {
        assert!(message_matches(
            "Não há turno aberto para lançamentos",
            NO_OPEN_SHIFT_PHRASES
        ));
        assert!(!message_matches(
            "Existe um turno em aberto (ID: 7)",
            NO_OPEN_SHIFT_PHRASES
        ));
    }
}
