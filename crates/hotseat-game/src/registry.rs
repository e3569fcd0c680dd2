//! The process-wide session table and pin allocation.
//!
//! [`SessionRegistry`] is a plain map plus a connection index; it does
//! no locking itself. The router wraps it in a mutex and serializes all
//! access, which keeps this crate free of async machinery.

use std::collections::HashMap;

use hotseat_protocol::GamePin;
use hotseat_transport::ConnectionId;
use rand::Rng;

use crate::{GameError, Session};

/// Mints candidate 6-digit join codes.
///
/// Generation is random, not sequential, so pins aren't guessable from
/// one another. Uniqueness is NOT guaranteed here — the caller checks
/// each candidate against the registry (and the session store) and
/// retries on collision.
#[derive(Debug, Default)]
pub struct PinAllocator;

impl PinAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Returns a random pin in `100000..=999999`.
    pub fn generate(&self) -> GamePin {
        let n: u32 = rand::rng().random_range(100_000..1_000_000);
        GamePin::new(n.to_string())
    }
}

/// All live sessions, keyed by pin, plus the reverse index that maps a
/// connection to the session it belongs to.
///
/// The index is what makes disconnect handling O(1): a socket closing
/// only knows its [`ConnectionId`], and the index answers which session
/// that connection was the host or a player of.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<GamePin, Session>,
    connections: HashMap<ConnectionId, GamePin>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live session holds this pin.
    pub fn contains_pin(&self, pin: &GamePin) -> bool {
        self.sessions.contains_key(pin)
    }

    /// Inserts a new session and indexes its host connection.
    ///
    /// # Errors
    /// Returns [`GameError::PinInUse`] if the pin is already taken; the
    /// allocation loop treats that as a signal to retry.
    pub fn insert(&mut self, session: Session) -> Result<(), GameError> {
        let pin = session.pin().clone();
        if self.sessions.contains_key(&pin) {
            return Err(GameError::PinInUse(pin));
        }
        self.connections
            .insert(session.host_connection(), pin.clone());
        self.sessions.insert(pin, session);
        Ok(())
    }

    /// Looks up a session by pin.
    ///
    /// # Errors
    /// Returns [`GameError::UnknownPin`] when no live session holds it.
    pub fn get(&self, pin: &GamePin) -> Result<&Session, GameError> {
        self.sessions
            .get(pin)
            .ok_or_else(|| GameError::UnknownPin(pin.clone()))
    }

    /// Mutable lookup by pin.
    pub fn get_mut(&mut self, pin: &GamePin) -> Result<&mut Session, GameError> {
        self.sessions
            .get_mut(pin)
            .ok_or_else(|| GameError::UnknownPin(pin.clone()))
    }

    /// Removes a session (terminal transition) and drops every index
    /// entry that pointed at it. Returns the session if it existed.
    pub fn remove(&mut self, pin: &GamePin) -> Option<Session> {
        let session = self.sessions.remove(pin)?;
        self.connections.retain(|_, p| p != pin);
        Some(session)
    }

    /// Indexes a player connection under the session it joined.
    pub fn index_member(&mut self, connection: ConnectionId, pin: GamePin) {
        self.connections.insert(connection, pin);
    }

    /// Drops one connection from the index (player leave).
    pub fn unindex(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
    }

    /// The pin of the session this connection belongs to, if any.
    pub fn pin_for_connection(&self, connection: ConnectionId) -> Option<&GamePin> {
        self.connections.get(&connection)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
