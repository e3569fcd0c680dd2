//! Unified error type for the Hotseat server.

use hotseat_game::GameError;
use hotseat_protocol::ProtocolError;
use hotseat_store::{CatalogError, StoreError};
use hotseat_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `hotseat` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HotseatError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level rejection (unknown pin, not host, bad state).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A quiz catalog error (not found, unavailable).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A session store error (record not found, unavailable).
    #[error(transparent)]
    Store(#[from] StoreError),
}
