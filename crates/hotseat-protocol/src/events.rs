//! The events that travel on the wire.
//!
//! Everything is internally tagged (`{"type": "...", ...}`) with
//! camelCase names, matching what the browser clients expect.

use serde::{Deserialize, Serialize};

use crate::quiz::MatchingPair;
use crate::types::{FinalStanding, GamePin, HostId, PlayerSummary, QuizId};
use crate::QuestionView;

/// Events sent by hosts and players to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Host → server: create a game for a quiz, allocating a pin.
    CreateGame { quiz_id: QuizId, host_id: HostId },

    /// Host → server: move the lobby into the first question.
    StartGame { pin: GamePin },

    /// Host → server: advance to the next question, or finish.
    NextQuestion { pin: GamePin },

    /// Player → server: join a lobby under a nickname.
    JoinGame { pin: GamePin, nickname: String },

    /// Player → server: submit an answer for the current question.
    SubmitAnswer {
        pin: GamePin,
        question_index: usize,
        answer: Answer,
    },
}

/// A submitted answer, tagged by question type.
///
/// The tag must match the current question's type; a mismatched tag is
/// treated as an incorrect answer, not a protocol error — it still
/// consumes the player's one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Answer {
    /// The id of the selected option.
    MultipleChoice { option_id: String },
    /// The submitted boolean.
    TrueFalse { value: bool },
    /// Free-form text for a fill-in-the-blank question.
    FillBlank { text: String },
    /// The submitted set of term/definition pairs.
    Matching { pairs: Vec<MatchingPair> },
}

/// Events sent by the server to hosts and players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// → host: the game exists, here is its pin.
    GameCreated { pin: GamePin, quiz_title: String },

    /// → joining player: you are in the lobby.
    JoinedGame {
        pin: GamePin,
        nickname: String,
        quiz_title: String,
    },

    /// → joining player: the join was rejected.
    JoinError { code: String, message: String },

    /// → host: the roster after a join.
    PlayerJoined { players: Vec<PlayerSummary> },

    /// → host: the roster after a player dropped.
    PlayerLeft { players: Vec<PlayerSummary> },

    /// → room: a question is open. Never includes the answer key.
    Question(QuestionView),

    /// → submitter: the private outcome of an answer.
    AnswerResult {
        is_correct: bool,
        points_earned: u32,
        current_score: u32,
    },

    /// → host: a player has answered the current question.
    PlayerAnswered {
        nickname: String,
        is_correct: bool,
        score: u32,
        question_index: usize,
    },

    /// → room: live leaderboard after a scored answer. Unordered;
    /// display ordering is a client concern.
    ScoreUpdate { players: Vec<PlayerSummary> },

    /// → room: the final leaderboard, sorted by score descending.
    EndGame { results: Vec<FinalStanding> },

    /// → remaining players: the host vanished, the game is over.
    GameEndedUnexpectedly { reason: String },

    /// → initiating connection: a rejected operation, never broadcast.
    GameError { code: String, message: String },
}
