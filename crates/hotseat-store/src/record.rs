//! The durable record of one game.

use std::time::{SystemTime, UNIX_EPOCH};

use hotseat_protocol::{FinalStanding, GamePin, HostId, QuizId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a stored record.
///
/// A record is created in `Lobby` when the game is created and moves to
/// `Finished` when the match completes. Aborted games (host loss) leave
/// their record in `Lobby`; the pin stays burned either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordStatus {
    Lobby,
    Finished,
}

/// One persisted game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// The pin the game ran under.
    pub pin: GamePin,
    /// The quiz that was played.
    pub quiz_id: QuizId,
    /// The host account that created the game.
    pub host_id: HostId,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Final leaderboard, present once finished.
    pub results: Vec<FinalStanding>,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl GameRecord {
    /// Builds a fresh `Lobby` record stamped with the current time.
    pub fn new(pin: GamePin, quiz_id: QuizId, host_id: HostId) -> Self {
        Self {
            pin,
            quiz_id,
            host_id,
            status: RecordStatus::Lobby,
            results: Vec::new(),
            created_at: unix_millis(),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
