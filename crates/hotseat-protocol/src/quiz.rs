//! The quiz data model and its player-facing projection.
//!
//! A [`QuizSnapshot`] is the immutable copy of a quiz taken when a game
//! is created — later edits to the stored quiz never affect a running
//! session. The snapshot carries the full answer key; what goes on the
//! wire to the room is the stripped [`QuestionView`].

use serde::{Deserialize, Serialize};

/// Default per-question time limit in seconds, matching the authoring
/// tool's default.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 20;

/// An immutable, self-contained copy of a quiz definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    /// Display title, echoed in `gameCreated` and `joinedGame`.
    pub title: String,
    /// Ordered question list. The session's question cursor indexes
    /// into this vector.
    pub questions: Vec<Question>,
}

/// One question of a quiz, including its answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The prompt shown to everyone.
    pub question_text: String,
    /// Optional illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Advisory countdown in seconds; also the denominator of the
    /// scoring formula.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// Type-specific content and answer key.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}

/// The type-specific part of a question: its content plus answer key.
///
/// Tagged so catalog data is self-describing. The key side of each
/// variant never leaves the server — see [`Question::player_view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType", rename_all = "camelCase")]
pub enum QuestionKind {
    /// Pick one option; exactly the flagged options are correct.
    MultipleChoice {
        /// The selectable options, including correctness flags.
        options: Vec<AnswerOption>,
    },
    /// A true/false statement.
    TrueFalse {
        /// The stored boolean answer.
        answer: bool,
    },
    /// Free-form text matched case-insensitively against the key.
    FillBlank {
        /// The stored answer text.
        answer: String,
    },
    /// Match every term to its definition; all-or-nothing.
    Matching {
        /// The key pairs.
        pairs: Vec<MatchingPair>,
    },
}

impl QuestionKind {
    /// Returns the wire-level type tag for this kind.
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::MultipleChoice { .. } => QuestionType::MultipleChoice,
            Self::TrueFalse { .. } => QuestionType::TrueFalse,
            Self::FillBlank { .. } => QuestionType::FillBlank,
            Self::Matching { .. } => QuestionType::Matching,
        }
    }
}

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Stable identifier the player submits back.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Whether picking this option is correct. Never sent to players.
    pub is_correct: bool,
}

/// A term/definition pair, used both in matching keys and submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    /// The term side.
    pub term: String,
    /// The definition the term must be matched to.
    pub definition: String,
}

/// The wire tag naming a question's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    Matching,
}

/// The answer-stripped projection of a question, broadcast to the room.
///
/// For multiple choice the option ids and texts survive but the
/// correctness flags do not; for every other type no key material is
/// sent at all — the client submits free-form input matched against a
/// key it never sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// Index of this question within the quiz.
    pub question_index: usize,
    /// The prompt.
    pub question_text: String,
    /// Optional illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// The question's type tag, so clients render the right input.
    pub question_type: QuestionType,
    /// Advisory countdown in seconds.
    pub time_limit: u32,
    /// Options without correctness flags; only for multiple choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_options: Option<Vec<AnswerOptionView>>,
}

/// An option as shown to players: id and text, no correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOptionView {
    /// Stable identifier the player submits back.
    pub id: String,
    /// Display text.
    pub text: String,
}

impl Question {
    /// Builds the player-facing projection of this question.
    pub fn player_view(&self, question_index: usize) -> QuestionView {
        let answer_options = match &self.kind {
            QuestionKind::MultipleChoice { options } => Some(
                options
                    .iter()
                    .map(|o| AnswerOptionView {
                        id: o.id.clone(),
                        text: o.text.clone(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        QuestionView {
            question_index,
            question_text: self.question_text.clone(),
            image_url: self.image_url.clone(),
            question_type: self.kind.question_type(),
            time_limit: self.time_limit_secs,
            answer_options,
        }
    }
}
