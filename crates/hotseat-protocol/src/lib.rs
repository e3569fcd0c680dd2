//! Wire protocol for Hotseat.
//!
//! This crate defines the "language" that hosts, players, and the server
//! speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`Answer`]) — the
//!   messages that travel on the wire.
//! - **Quiz model** ([`QuizSnapshot`], [`Question`], [`QuestionKind`]) —
//!   the immutable quiz definition a session plays through, plus the
//!   answer-stripped [`QuestionView`] projection sent to the room.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are
//!   converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the game
//! core (session state). It doesn't know about connections or sessions —
//! it only knows how to describe and serialize events.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Game (session state)
//! ```

mod codec;
mod error;
mod events;
mod quiz;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{Answer, ClientEvent, ServerEvent};
pub use quiz::{
    AnswerOption, AnswerOptionView, MatchingPair, Question, QuestionKind,
    QuestionType, QuestionView, QuizSnapshot,
};
pub use types::{
    FinalStanding, GamePin, HostId, PlayerSummary, QuizId, Recipient,
    RecordId,
};
