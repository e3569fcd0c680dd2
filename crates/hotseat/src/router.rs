//! The event router: one serialized reactor over all live sessions.
//!
//! Every typed [`ClientEvent`] lands here. The router locks the shared
//! state, applies the operation to the right [`Session`], resolves the
//! returned recipients, and pushes the resulting [`ServerEvent`]s onto
//! per-connection outbound channels. Delivery to the socket happens in
//! each connection's writer task, so nothing network-bound ever runs
//! under the lock.
//!
//! Catalog and store calls are async and run strictly outside the lock.
//! The store is treated as best-effort: a failed record write degrades
//! durability and logs a warning, it never fails a live game.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use hotseat_game::{
    AdvanceOutcome, DisconnectOutcome, GameError, PinAllocator, Session,
    SessionRegistry,
};
use hotseat_protocol::{ClientEvent, GamePin, HostId, QuizId, ServerEvent};
use hotseat_store::{CatalogError, QuizCatalog, SessionStore};
use hotseat_transport::ConnectionId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// Everything behind the router's single lock: the session table and
/// the outbound channel for every registered connection.
struct RouterInner {
    registry: SessionRegistry,
    senders: HashMap<ConnectionId, UnboundedSender<ServerEvent>>,
}

impl RouterInner {
    /// Pushes one event onto a connection's outbound channel.
    ///
    /// A missing or closed channel means the connection is already on
    /// its way out; the event is dropped and disconnect handling will
    /// clean up the rest.
    fn push(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&connection) {
            if sender.send(event).is_err() {
                tracing::debug!(
                    %connection,
                    "outbound channel closed, dropping event"
                );
            }
        }
    }

    fn deliver(&self, resolved: Vec<(ConnectionId, ServerEvent)>) {
        for (connection, event) in resolved {
            self.push(connection, event);
        }
    }
}

/// Routes client events to sessions and fans server events back out.
///
/// Generic over the two external seams so production can plug in real
/// backends while tests and the demo use the in-memory ones.
pub struct EventRouter<C: QuizCatalog, S: SessionStore> {
    catalog: C,
    store: Arc<S>,
    allocator: PinAllocator,
    inner: Mutex<RouterInner>,
}

impl<C: QuizCatalog, S: SessionStore> EventRouter<C, S> {
    /// The store arrives in an `Arc` so callers can keep a handle to it
    /// (record finalization runs on detached tasks).
    pub fn new(catalog: C, store: Arc<S>) -> Self {
        Self {
            catalog,
            store,
            allocator: PinAllocator::new(),
            inner: Mutex::new(RouterInner {
                registry: SessionRegistry::new(),
                senders: HashMap::new(),
            }),
        }
    }

    /// Registers a connection and returns the receiving end of its
    /// outbound channel. The handler's writer task drains it.
    pub async fn register(
        &self,
        connection: ConnectionId,
    ) -> UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().await.senders.insert(connection, tx);
        rx
    }

    /// Drops a connection's outbound channel. Called after disconnect
    /// handling, so farewell events to *other* members still go out.
    pub async fn unregister(&self, connection: ConnectionId) {
        self.inner.lock().await.senders.remove(&connection);
    }

    /// Sends one event directly to a connection, bypassing any session.
    /// Used for frame-level errors the router can't attribute to a pin.
    pub async fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        self.inner.lock().await.push(connection, event);
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Dispatches one decoded client event.
    ///
    /// Never returns an error: rejections are reported to the
    /// initiating connection as `gameError`/`joinError` events and
    /// leave all state untouched.
    pub async fn handle_event(&self, connection: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::CreateGame { quiz_id, host_id } => {
                self.create_game(connection, quiz_id, host_id).await;
            }
            ClientEvent::StartGame { pin } => {
                let mut inner = self.inner.lock().await;
                let result = inner.registry.get_mut(&pin).and_then(|session| {
                    let messages = session.start(connection, Instant::now())?;
                    Ok(session.resolve(messages))
                });
                match result {
                    Ok(resolved) => inner.deliver(resolved),
                    Err(e) => inner.push(connection, game_error(&e)),
                }
            }
            ClientEvent::NextQuestion { pin } => {
                self.next_question(connection, pin).await;
            }
            ClientEvent::JoinGame { pin, nickname } => {
                let mut inner = self.inner.lock().await;
                // A connection holds at most one seat across all games;
                // letting it take a second would orphan the first in
                // the disconnect index.
                let result = if inner.registry.pin_for_connection(connection).is_some() {
                    Err(GameError::AlreadyJoined)
                } else {
                    inner.registry.get_mut(&pin).and_then(|session| {
                        let messages = session.join(connection, nickname)?;
                        Ok(session.resolve(messages))
                    })
                };
                match result {
                    Ok(resolved) => {
                        inner.registry.index_member(connection, pin);
                        inner.deliver(resolved);
                    }
                    Err(e) => inner.push(
                        connection,
                        ServerEvent::JoinError {
                            code: e.code().into(),
                            message: e.to_string(),
                        },
                    ),
                }
            }
            ClientEvent::SubmitAnswer {
                pin,
                question_index,
                answer,
            } => {
                let mut inner = self.inner.lock().await;
                let result = inner.registry.get_mut(&pin).and_then(|session| {
                    let messages = session.submit_answer(
                        connection,
                        question_index,
                        &answer,
                        Instant::now(),
                    )?;
                    Ok(session.resolve(messages))
                });
                match result {
                    Ok(resolved) => inner.deliver(resolved),
                    Err(e) => inner.push(connection, game_error(&e)),
                }
            }
        }
    }

    /// Creates a session: snapshot the quiz, allocate a unique pin,
    /// register the session, then ask the store for a durable record.
    async fn create_game(
        &self,
        connection: ConnectionId,
        quiz_id: QuizId,
        host_id: HostId,
    ) {
        // One session per connection: a host (or seated player) cannot
        // open another game, or its disconnect would resolve to only
        // one of them. Events from a single connection are handled
        // sequentially, so this check cannot race with the insert below.
        {
            let inner = self.inner.lock().await;
            if inner.registry.pin_for_connection(connection).is_some() {
                inner.push(connection, game_error(&GameError::AlreadyJoined));
                return;
            }
        }

        let quiz = match self.catalog.quiz_by_id(&quiz_id).await {
            Ok(quiz) => quiz,
            Err(e) => {
                tracing::warn!(%quiz_id, error = %e, "quiz lookup failed");
                self.send_to(connection, catalog_error(&e)).await;
                return;
            }
        };
        if quiz.questions.is_empty() {
            self.send_to(connection, game_error(&GameError::EmptyQuiz))
                .await;
            return;
        }

        // Pin allocation: candidates are checked against the store's
        // history outside the lock, then claimed atomically against the
        // live registry. A store failure degrades to live-only checks.
        let pin = loop {
            let candidate = self.allocator.generate();
            match self.store.pin_in_use(&candidate).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    error = %e,
                    "pin history check unavailable, using live registry only"
                ),
            }

            let session = match Session::new(
                candidate.clone(),
                connection,
                host_id.clone(),
                quiz_id.clone(),
                quiz.clone(),
            ) {
                Ok(session) => session,
                Err(e) => {
                    self.send_to(connection, game_error(&e)).await;
                    return;
                }
            };

            let mut inner = self.inner.lock().await;
            if inner.registry.insert(session).is_err() {
                // Claimed by a racing creation since generation; retry.
                continue;
            }
            inner.push(
                connection,
                ServerEvent::GameCreated {
                    pin: candidate.clone(),
                    quiz_title: quiz.title.clone(),
                },
            );
            break candidate;
        };

        tracing::info!(%pin, %quiz_id, %host_id, "game created");

        // Best-effort durability. The game is already live; a failure
        // here only means no record to finalize later.
        match self.store.create_record(&quiz_id, &host_id, &pin).await {
            Ok(record_id) => {
                let mut inner = self.inner.lock().await;
                // The session may have aborted while the store call ran.
                if let Ok(session) = inner.registry.get_mut(&pin) {
                    session.set_record_id(record_id);
                }
            }
            Err(e) => tracing::warn!(
                %pin,
                error = %e,
                "game record creation failed, continuing without persistence"
            ),
        }
    }

    /// Advances a session, finishing it if the quiz is exhausted.
    async fn next_question(&self, connection: ConnectionId, pin: GamePin) {
        let mut inner = self.inner.lock().await;
        let outcome = inner
            .registry
            .get_mut(&pin)
            .and_then(|session| session.advance(connection, Instant::now()));

        match outcome {
            Ok(AdvanceOutcome::NextQuestion(messages)) => {
                // The session is still live; resolve against it.
                let resolved = match inner.registry.get(&pin) {
                    Ok(session) => session.resolve(messages),
                    Err(_) => return,
                };
                inner.deliver(resolved);
            }
            Ok(AdvanceOutcome::Finished {
                messages,
                results,
                record_id,
            }) => {
                let resolved = match inner.registry.get(&pin) {
                    Ok(session) => session.resolve(messages),
                    Err(_) => return,
                };
                inner.registry.remove(&pin);
                inner.deliver(resolved);
                drop(inner);

                tracing::info!(%pin, "game finished, pin released");
                if let Some(record_id) = record_id {
                    // Fire-and-forget: the room has its results either way.
                    let store = Arc::clone(&self.store);
                    tokio::spawn(async move {
                        if let Err(e) =
                            store.finalize_record(record_id, &results).await
                        {
                            tracing::warn!(
                                %record_id,
                                error = %e,
                                "failed to finalize game record"
                            );
                        }
                    });
                }
            }
            Err(e) => inner.push(connection, game_error(&e)),
        }
    }

    /// Applies a connection loss: abort the session if it was the host,
    /// shrink the roster if it was a player, no-op otherwise.
    pub async fn handle_disconnect(&self, connection: ConnectionId) {
        let mut inner = self.inner.lock().await;
        let Some(pin) = inner.registry.pin_for_connection(connection).cloned() else {
            return;
        };
        let Ok(session) = inner.registry.get_mut(&pin) else {
            return;
        };

        match session.handle_disconnect(connection) {
            DisconnectOutcome::HostLost { messages } => {
                let resolved = session.resolve(messages);
                inner.registry.remove(&pin);
                inner.deliver(resolved);
            }
            DisconnectOutcome::PlayerLeft { messages } => {
                let resolved = session.resolve(messages);
                inner.registry.unindex(connection);
                inner.deliver(resolved);
            }
            DisconnectOutcome::NotMember => {
                inner.registry.unindex(connection);
            }
        }
    }
}

/// Maps a game rejection to the private `gameError` event.
fn game_error(e: &GameError) -> ServerEvent {
    ServerEvent::GameError {
        code: e.code().into(),
        message: e.to_string(),
    }
}

/// Maps a catalog failure to the private `gameError` event.
fn catalog_error(e: &CatalogError) -> ServerEvent {
    let code = match e {
        CatalogError::NotFound(_) => "quiz_not_found",
        CatalogError::Unavailable(_) => "catalog_unavailable",
    };
    ServerEvent::GameError {
        code: code.into(),
        message: e.to_string(),
    }
}
