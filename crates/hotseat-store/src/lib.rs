//! External collaborator interfaces for Hotseat.
//!
//! The orchestrator doesn't own quiz authoring or long-term storage —
//! those live behind two seams:
//!
//! 1. **Quiz catalog** ([`QuizCatalog`]) — read a quiz by id, consumed
//!    once per game at creation time to take the immutable snapshot.
//! 2. **Session store** ([`SessionStore`]) — durable create/finalize of
//!    a game record, plus the historical pin-uniqueness check.
//!
//! # Why traits?
//!
//! Production deployments back these with whatever database the rest of
//! the product uses; tests and the demo use the in-memory
//! [`MemoryCatalog`] / [`MemoryStore`]. The router never knows the
//! difference.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod record;

use std::future::Future;

use hotseat_protocol::{FinalStanding, GamePin, HostId, QuizId, QuizSnapshot, RecordId};

pub use error::{CatalogError, StoreError};
pub use memory::{MemoryCatalog, MemoryStore};
pub use record::{GameRecord, RecordStatus};

/// Read access to stored quiz definitions.
pub trait QuizCatalog: Send + Sync + 'static {
    /// Fetches the quiz with the given id.
    ///
    /// # Errors
    /// - [`CatalogError::NotFound`] — no quiz under that id
    /// - [`CatalogError::Unavailable`] — the backing service failed
    fn quiz_by_id(
        &self,
        id: &QuizId,
    ) -> impl Future<Output = Result<QuizSnapshot, CatalogError>> + Send;
}

/// Durable storage of game records.
///
/// From the live protocol's perspective every call here is
/// fire-and-forget: a store failure is a degraded-durability condition
/// surfaced to operators, never a reason to stall or roll back a game.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns whether any historical record already references `pin`.
    ///
    /// Used by pin allocation alongside the live-registry check.
    fn pin_in_use(
        &self,
        pin: &GamePin,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Creates a record for a newly created game, status `Lobby`.
    fn create_record(
        &self,
        quiz_id: &QuizId,
        host_id: &HostId,
        pin: &GamePin,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Marks a record finished and attaches the final leaderboard.
    fn finalize_record(
        &self,
        record_id: RecordId,
        results: &[FinalStanding],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
