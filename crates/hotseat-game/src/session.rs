//! The per-match state machine.
//!
//! A [`Session`] owns the ephemeral state of one game: the immutable
//! quiz snapshot, the roster, the question cursor, and the answered set.
//! Operations validate their preconditions, mutate, and return the
//! outbound events to deliver — delivery itself belongs to the router.
//!
//! ```text
//! Lobby ──start──▶ InProgress ──advance──▶ … ──advance past end──▶ Finished
//!   │                  │
//!   └── host lost ─────┴──────────────────────────────────────────▶ Aborted
//! ```
//!
//! `Finished` and `Aborted` are terminal: the registry entry is deleted
//! and the pin becomes unknown to any later event.

use std::collections::HashSet;
use std::time::Instant;

use hotseat_protocol::{
    Answer, FinalStanding, GamePin, HostId, PlayerSummary, QuizId,
    QuizSnapshot, Recipient, RecordId, ServerEvent,
};
use hotseat_transport::ConnectionId;

use crate::scoring;
use crate::GameError;

/// An outbound event paired with who should receive it.
pub type Outbound = (Recipient, ServerEvent);

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting players; the quiz hasn't started.
    Lobby,
    /// A question is open (or between questions).
    InProgress,
    /// The quiz ran to completion.
    Finished,
    /// The host connection was lost mid-game.
    Aborted,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// One joined player.
#[derive(Debug, Clone)]
pub struct Player {
    /// The live connection this player answers from.
    pub connection: ConnectionId,
    /// Unique within the session, compared exactly as entered.
    pub nickname: String,
    /// Cumulative score; never decreases.
    pub score: u32,
}

/// What [`Session::advance`] did.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// A further question was opened.
    NextQuestion(Vec<Outbound>),
    /// The cursor moved past the last question; the session is
    /// `Finished` and must be removed from the registry. `results` is
    /// the sorted leaderboard for the persistence request.
    Finished {
        messages: Vec<Outbound>,
        results: Vec<FinalStanding>,
        record_id: Option<RecordId>,
    },
}

/// What a connection loss meant to this session.
#[derive(Debug)]
pub enum DisconnectOutcome {
    /// The host vanished; the session is `Aborted` and must be removed
    /// from the registry.
    HostLost { messages: Vec<Outbound> },
    /// A player dropped; the roster shrank.
    PlayerLeft { messages: Vec<Outbound> },
    /// The connection wasn't part of this session.
    NotMember,
}

/// The in-memory record of one live match.
pub struct Session {
    pin: GamePin,
    host_connection: ConnectionId,
    host_id: HostId,
    quiz_id: QuizId,
    quiz: QuizSnapshot,
    status: SessionStatus,
    /// Join order doubles as the ranking tie-break.
    players: Vec<Player>,
    /// `None` until the game starts; advances monotonically.
    current_question: Option<usize>,
    /// The sole time origin for scoring the open question.
    question_started_at: Option<Instant>,
    /// Exactly-once guard, cleared on every question transition.
    answered: HashSet<ConnectionId>,
    /// Durable record handle, if the store accepted one.
    record_id: Option<RecordId>,
}

impl Session {
    /// Creates a session in `Lobby` around an immutable quiz snapshot.
    ///
    /// # Errors
    /// Returns [`GameError::EmptyQuiz`] for a quiz with no questions —
    /// such a game could never satisfy the cursor invariant.
    pub fn new(
        pin: GamePin,
        host_connection: ConnectionId,
        host_id: HostId,
        quiz_id: QuizId,
        quiz: QuizSnapshot,
    ) -> Result<Self, GameError> {
        if quiz.questions.is_empty() {
            return Err(GameError::EmptyQuiz);
        }
        Ok(Self {
            pin,
            host_connection,
            host_id,
            quiz_id,
            quiz,
            status: SessionStatus::Lobby,
            players: Vec::new(),
            current_question: None,
            question_started_at: None,
            answered: HashSet::new(),
            record_id: None,
        })
    }

    // -- Accessors --------------------------------------------------------

    /// The session's join code.
    pub fn pin(&self) -> &GamePin {
        &self.pin
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The one connection allowed to drive transitions.
    pub fn host_connection(&self) -> ConnectionId {
        self.host_connection
    }

    /// The host account id, for the persistence record.
    pub fn host_id(&self) -> &HostId {
        &self.host_id
    }

    /// The quiz id the snapshot was taken from.
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    /// The quiz title, echoed in acks.
    pub fn quiz_title(&self) -> &str {
        &self.quiz.title
    }

    /// Index of the open question, if the game has started.
    pub fn current_question(&self) -> Option<usize> {
        self.current_question
    }

    /// The joined players, in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Durable record handle, if the store accepted one.
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    /// Attaches the store's record id after creation.
    pub fn set_record_id(&mut self, id: RecordId) {
        self.record_id = Some(id);
    }

    /// Every live connection belonging to this session: host first,
    /// then players in join order.
    pub fn member_connections(&self) -> Vec<ConnectionId> {
        std::iter::once(self.host_connection)
            .chain(self.players.iter().map(|p| p.connection))
            .collect()
    }

    /// The current roster as wire summaries.
    pub fn roster(&self) -> Vec<PlayerSummary> {
        self.players
            .iter()
            .map(|p| PlayerSummary {
                nickname: p.nickname.clone(),
                score: p.score,
            })
            .collect()
    }

    /// Resolves recipient-tagged messages to concrete connections.
    ///
    /// Must be called before the session is dropped from the registry —
    /// terminal transitions resolve their own fan-out first.
    pub fn resolve(&self, messages: Vec<Outbound>) -> Vec<(ConnectionId, ServerEvent)> {
        let mut resolved = Vec::new();
        for (recipient, event) in messages {
            match recipient {
                Recipient::Room => {
                    resolved.push((self.host_connection, event.clone()));
                    for p in &self.players {
                        resolved.push((p.connection, event.clone()));
                    }
                }
                Recipient::Players => {
                    for p in &self.players {
                        resolved.push((p.connection, event.clone()));
                    }
                }
                Recipient::Host => {
                    resolved.push((self.host_connection, event));
                }
                Recipient::Connection(conn) => {
                    resolved.push((conn, event));
                }
            }
        }
        resolved
    }

    // -- Lobby ------------------------------------------------------------

    /// Adds a player to the roster. Lobby only.
    ///
    /// # Errors
    /// - [`GameError::NotInLobby`] — the game already started or ended
    /// - [`GameError::NicknameTaken`] — exact-match collision
    /// - [`GameError::AlreadyJoined`] — the connection is already the
    ///   host or a player here
    pub fn join(
        &mut self,
        connection: ConnectionId,
        nickname: String,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.status != SessionStatus::Lobby {
            return Err(GameError::NotInLobby(self.pin.clone()));
        }
        if connection == self.host_connection
            || self.players.iter().any(|p| p.connection == connection)
        {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.iter().any(|p| p.nickname == nickname) {
            return Err(GameError::NicknameTaken(nickname));
        }

        self.players.push(Player {
            connection,
            nickname: nickname.clone(),
            score: 0,
        });
        tracing::info!(
            pin = %self.pin,
            %connection,
            nickname,
            players = self.players.len(),
            "player joined"
        );

        Ok(vec![
            (
                Recipient::Connection(connection),
                ServerEvent::JoinedGame {
                    pin: self.pin.clone(),
                    nickname,
                    quiz_title: self.quiz.title.clone(),
                },
            ),
            (
                Recipient::Host,
                ServerEvent::PlayerJoined {
                    players: self.roster(),
                },
            ),
        ])
    }

    // -- Question lifecycle -----------------------------------------------

    /// `Lobby → InProgress`: opens the first question. Host only.
    ///
    /// # Errors
    /// - [`GameError::NotHost`] — caller isn't the host connection
    /// - [`GameError::NotInLobby`] — wrong state for starting
    pub fn start(
        &mut self,
        caller: ConnectionId,
        now: Instant,
    ) -> Result<Vec<Outbound>, GameError> {
        if caller != self.host_connection {
            return Err(GameError::NotHost);
        }
        if self.status != SessionStatus::Lobby {
            return Err(GameError::NotInLobby(self.pin.clone()));
        }

        self.status = SessionStatus::InProgress;
        tracing::info!(pin = %self.pin, "game started");
        Ok(self.open_question(0, now))
    }

    /// Advances the cursor: next question, or `Finished` past the end.
    /// Host only, in progress only.
    pub fn advance(
        &mut self,
        caller: ConnectionId,
        now: Instant,
    ) -> Result<AdvanceOutcome, GameError> {
        if caller != self.host_connection {
            return Err(GameError::NotHost);
        }
        if self.status != SessionStatus::InProgress {
            return Err(GameError::NotInProgress(self.pin.clone()));
        }

        let next = self.current_question.map_or(0, |i| i + 1);
        if next < self.quiz.questions.len() {
            return Ok(AdvanceOutcome::NextQuestion(
                self.open_question(next, now),
            ));
        }

        // Past the last question: finish.
        self.status = SessionStatus::Finished;
        let results = self.final_results();
        tracing::info!(
            pin = %self.pin,
            players = self.players.len(),
            "game finished"
        );

        Ok(AdvanceOutcome::Finished {
            messages: vec![(
                Recipient::Room,
                ServerEvent::EndGame {
                    results: results.clone(),
                },
            )],
            results,
            record_id: self.record_id,
        })
    }

    /// Stamps the question clock, clears the answered set, and builds
    /// the room broadcast for question `index`.
    fn open_question(&mut self, index: usize, now: Instant) -> Vec<Outbound> {
        self.current_question = Some(index);
        self.question_started_at = Some(now);
        self.answered.clear();

        let view = self.quiz.questions[index].player_view(index);
        vec![(Recipient::Room, ServerEvent::Question(view))]
    }

    /// Ranking: score descending, stable by join order on ties.
    fn final_results(&self) -> Vec<FinalStanding> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
            .into_iter()
            .map(|p| FinalStanding {
                nickname: p.nickname.clone(),
                final_score: p.score,
            })
            .collect()
    }

    // -- Answers ----------------------------------------------------------

    /// Scores one answer, exactly once per player per question.
    ///
    /// The connection is marked as having answered *before* evaluation,
    /// so a duplicate racing in can never score twice. A malformed or
    /// type-mismatched answer is accepted as incorrect and still burns
    /// the attempt.
    pub fn submit_answer(
        &mut self,
        connection: ConnectionId,
        question_index: usize,
        answer: &Answer,
        now: Instant,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.status != SessionStatus::InProgress {
            return Err(GameError::NotInProgress(self.pin.clone()));
        }
        let (current, started_at) = match (self.current_question, self.question_started_at) {
            (Some(c), Some(s)) => (c, s),
            _ => return Err(GameError::NotInProgress(self.pin.clone())),
        };
        if question_index != current {
            return Err(GameError::QuestionMismatch {
                submitted: question_index,
                current,
            });
        }
        if !self.players.iter().any(|p| p.connection == connection) {
            return Err(GameError::UnknownPlayer);
        }
        if !self.answered.insert(connection) {
            return Err(GameError::AlreadyAnswered);
        }

        let question = &self.quiz.questions[current];
        let is_correct = scoring::evaluate(&question.kind, answer);
        let points_earned = if is_correct {
            scoring::points(
                now.duration_since(started_at),
                question.time_limit_secs,
            )
        } else {
            0
        };

        // Checked above; the map keeps the borrow checker satisfied.
        let player = self
            .players
            .iter_mut()
            .find(|p| p.connection == connection)
            .ok_or(GameError::UnknownPlayer)?;
        player.score += points_earned;
        let nickname = player.nickname.clone();
        let score = player.score;

        tracing::debug!(
            pin = %self.pin,
            nickname,
            is_correct,
            points_earned,
            question_index,
            "answer scored"
        );

        Ok(vec![
            (
                Recipient::Connection(connection),
                ServerEvent::AnswerResult {
                    is_correct,
                    points_earned,
                    current_score: score,
                },
            ),
            (
                Recipient::Host,
                ServerEvent::PlayerAnswered {
                    nickname,
                    is_correct,
                    score,
                    question_index,
                },
            ),
            (
                Recipient::Room,
                ServerEvent::ScoreUpdate {
                    players: self.roster(),
                },
            ),
        ])
    }

    // -- Disconnects ------------------------------------------------------

    /// Applies a connection loss to this session.
    ///
    /// Host identity wins the disambiguation: if the lost connection is
    /// the host, the whole session aborts even if it somehow also
    /// appeared in the roster.
    pub fn handle_disconnect(&mut self, connection: ConnectionId) -> DisconnectOutcome {
        if connection == self.host_connection {
            self.status = SessionStatus::Aborted;
            tracing::info!(pin = %self.pin, "host disconnected, aborting game");
            return DisconnectOutcome::HostLost {
                messages: vec![(
                    Recipient::Players,
                    ServerEvent::GameEndedUnexpectedly {
                        reason: "Host disconnected.".into(),
                    },
                )],
            };
        }

        let Some(idx) = self
            .players
            .iter()
            .position(|p| p.connection == connection)
        else {
            return DisconnectOutcome::NotMember;
        };

        let left = self.players.remove(idx);
        self.answered.remove(&connection);
        tracing::info!(
            pin = %self.pin,
            nickname = left.nickname,
            players = self.players.len(),
            "player left"
        );

        DisconnectOutcome::PlayerLeft {
            messages: vec![(
                Recipient::Host,
                ServerEvent::PlayerLeft {
                    players: self.roster(),
                },
            )],
        }
    }
}
