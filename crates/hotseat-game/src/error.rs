//! Error types for the game core.

use hotseat_protocol::GamePin;

/// Every way a session operation can be rejected.
///
/// Rejections leave state untouched and are reported only to the
/// initiating connection, so each variant carries a stable wire code
/// (see [`GameError::code`]) that clients can branch on.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No live session under this pin.
    #[error("game {0} not found")]
    UnknownPin(GamePin),

    /// The pin is already claimed by a live session. Internal to
    /// allocation retry; never reaches a client.
    #[error("pin {0} is already in use")]
    PinInUse(GamePin),

    /// A join or start was attempted outside the lobby phase.
    #[error("game {0} is not in its lobby phase")]
    NotInLobby(GamePin),

    /// The nickname is already present in the roster.
    #[error("nickname {0:?} is already taken")]
    NicknameTaken(String),

    /// The connection already holds a seat — in this session or any
    /// other. A connection belongs to at most one game at a time.
    #[error("connection already belongs to a game")]
    AlreadyJoined,

    /// A host-only transition was invoked from another connection.
    #[error("only the host may do that")]
    NotHost,

    /// An in-progress-only operation arrived while the game wasn't.
    #[error("game {0} is not in progress")]
    NotInProgress(GamePin),

    /// The answer targets a question other than the current one.
    #[error("answer targets question {submitted}, current question is {current}")]
    QuestionMismatch { submitted: usize, current: usize },

    /// The submitting connection is not a player in this session.
    #[error("connection is not a player in this game")]
    UnknownPlayer,

    /// The player already used their one attempt for this question.
    #[error("already answered this question")]
    AlreadyAnswered,

    /// The quiz has no questions, so a game cannot be created for it.
    #[error("quiz has no questions")]
    EmptyQuiz,
}

impl GameError {
    /// The stable wire code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownPin(_) => "unknown_pin",
            Self::PinInUse(_) => "pin_in_use",
            Self::NotInLobby(_) => "not_in_lobby",
            Self::NicknameTaken(_) => "nickname_taken",
            Self::AlreadyJoined => "already_joined",
            Self::NotHost => "not_host",
            Self::NotInProgress(_) => "not_in_progress",
            Self::QuestionMismatch { .. } => "question_mismatch",
            Self::UnknownPlayer => "unknown_player",
            Self::AlreadyAnswered => "already_answered",
            Self::EmptyQuiz => "empty_quiz",
        }
    }
}
