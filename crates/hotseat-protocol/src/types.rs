//! Identity and summary types shared across the protocol.

use std::fmt;

use hotseat_transport::ConnectionId;
use serde::{Deserialize, Serialize};

/// The 6-digit join code identifying one live session.
///
/// Newtype over `String` so a pin can never be confused with a nickname
/// or a quiz id in a signature. `#[serde(transparent)]` keeps the JSON
/// representation a plain string: `"483920"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GamePin(String);

impl GamePin {
    /// Wraps a raw pin string.
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    /// Returns the pin as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GamePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a quiz in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Wraps a raw quiz id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the host account that created a game.
///
/// Opaque to the orchestrator — it only travels into the session store
/// record. Authentication of hosts happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Wraps a raw host id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a durable game record in the session store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec-{}", self.0)
    }
}

/// A nickname/score pair as shown in rosters and live leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// The player's nickname, unique within the session.
    pub nickname: String,
    /// Cumulative score.
    pub score: u32,
}

/// One row of the final leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStanding {
    /// The player's nickname.
    pub nickname: String,
    /// The score they finished with.
    pub final_score: u32,
}

/// Specifies who should receive a server event.
///
/// When a session operation runs, it returns a list of
/// `(Recipient, ServerEvent)` pairs. This enum tells the router WHERE
/// to deliver each event; the router resolves it against the session's
/// roster before pushing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The host plus every joined player.
    Room,

    /// Every joined player, but not the host. Used for the abort
    /// notice after the host connection is already gone.
    Players,

    /// The session's host connection only.
    Host,

    /// One specific connection (acks and private errors).
    Connection(ConnectionId),
}
