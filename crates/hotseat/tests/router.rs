//! Integration tests for the event router against the in-memory
//! catalog and store: create/join/play/finish, rejections, disconnects,
//! and store-failure tolerance.

use std::sync::Arc;
use std::time::Duration;

use hotseat::EventRouter;
use hotseat_protocol::{
    Answer, AnswerOption, ClientEvent, FinalStanding, GamePin, HostId,
    Question, QuestionKind, QuizId, QuizSnapshot, RecordId, ServerEvent,
};
use hotseat_store::{
    MemoryCatalog, MemoryStore, RecordStatus, SessionStore, StoreError,
};
use hotseat_transport::ConnectionId;
use tokio::sync::mpsc::UnboundedReceiver;

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn sample_quiz() -> QuizSnapshot {
    QuizSnapshot {
        title: "Capitals".into(),
        questions: vec![
            Question {
                question_text: "Capital of France?".into(),
                image_url: None,
                time_limit_secs: 20,
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        AnswerOption {
                            id: "paris".into(),
                            text: "Paris".into(),
                            is_correct: true,
                        },
                        AnswerOption {
                            id: "lyon".into(),
                            text: "Lyon".into(),
                            is_correct: false,
                        },
                    ],
                },
            },
            Question {
                question_text: "Berlin is in Germany.".into(),
                image_url: None,
                time_limit_secs: 10,
                kind: QuestionKind::TrueFalse { answer: true },
            },
        ],
    }
}

fn router_with_quiz(
    store: Arc<MemoryStore>,
) -> EventRouter<MemoryCatalog, MemoryStore> {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(QuizId::new("quiz-1"), sample_quiz());
    EventRouter::new(catalog, store)
}

/// Drains every event currently queued for a connection.
fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Pulls the pin out of a `gameCreated` ack.
fn created_pin(events: &[ServerEvent]) -> GamePin {
    match &events[0] {
        ServerEvent::GameCreated { pin, .. } => pin.clone(),
        other => panic!("expected gameCreated, got {other:?}"),
    }
}

async fn create_game(
    router: &EventRouter<MemoryCatalog, MemoryStore>,
    host: ConnectionId,
    host_rx: &mut UnboundedReceiver<ServerEvent>,
) -> GamePin {
    router
        .handle_event(
            host,
            ClientEvent::CreateGame {
                quiz_id: QuizId::new("quiz-1"),
                host_id: HostId::new("host-1"),
            },
        )
        .await;
    created_pin(&drain(host_rx))
}

#[tokio::test]
async fn test_create_game_allocates_pin_and_record() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(Arc::clone(&store));
    let mut host_rx = router.register(conn(1)).await;

    router
        .handle_event(
            conn(1),
            ClientEvent::CreateGame {
                quiz_id: QuizId::new("quiz-1"),
                host_id: HostId::new("host-1"),
            },
        )
        .await;

    let events = drain(&mut host_rx);
    match &events[0] {
        ServerEvent::GameCreated { pin, quiz_title } => {
            assert_eq!(pin.as_str().len(), 6);
            assert!(pin.as_str().chars().all(|c| c.is_ascii_digit()));
            assert_eq!(quiz_title, "Capitals");
        }
        other => panic!("expected gameCreated, got {other:?}"),
    }

    assert_eq!(router.session_count().await, 1);
    let record = store.record(RecordId(1)).unwrap();
    assert_eq!(record.status, RecordStatus::Lobby);
}

#[tokio::test]
async fn test_create_game_unknown_quiz_rejected() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(Arc::clone(&store));
    let mut host_rx = router.register(conn(1)).await;

    router
        .handle_event(
            conn(1),
            ClientEvent::CreateGame {
                quiz_id: QuizId::new("does-not-exist"),
                host_id: HostId::new("host-1"),
            },
        )
        .await;

    let events = drain(&mut host_rx);
    assert!(matches!(
        &events[0],
        ServerEvent::GameError { code, .. } if code == "quiz_not_found"
    ));
    assert_eq!(router.session_count().await, 0);
    assert!(store.is_empty(), "no record for a rejected creation");
}

#[tokio::test]
async fn test_join_unknown_pin_rejected() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut player_rx = router.register(conn(2)).await;

    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: GamePin::new("000000"),
                nickname: "Ada".into(),
            },
        )
        .await;

    let events = drain(&mut player_rx);
    assert!(matches!(
        &events[0],
        ServerEvent::JoinError { code, .. } if code == "unknown_pin"
    ));
}

#[tokio::test]
async fn test_duplicate_nickname_rejected_only_to_second_joiner() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_rx = router.register(conn(1)).await;
    let mut ada_rx = router.register(conn(2)).await;
    let mut imposter_rx = router.register(conn(3)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;

    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    router
        .handle_event(
            conn(3),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;

    assert!(matches!(
        &drain(&mut imposter_rx)[0],
        ServerEvent::JoinError { code, .. } if code == "nickname_taken"
    ));

    // The first Ada saw her own ack and nothing about the imposter.
    let ada_events = drain(&mut ada_rx);
    assert_eq!(ada_events.len(), 1);
    assert!(matches!(ada_events[0], ServerEvent::JoinedGame { .. }));

    // The host's roster still has one player.
    let host_events = drain(&mut host_rx);
    match host_events.last() {
        Some(ServerEvent::PlayerJoined { players }) => {
            assert_eq!(players.len(), 1);
        }
        other => panic!("expected roster update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_from_non_host_rejected() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_rx = router.register(conn(1)).await;
    let mut player_rx = router.register(conn(2)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;
    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut player_rx);

    router
        .handle_event(conn(2), ClientEvent::StartGame { pin })
        .await;

    let events = drain(&mut player_rx);
    assert!(matches!(
        &events[0],
        ServerEvent::GameError { code, .. } if code == "not_host"
    ));
    // No question reached the host.
    assert!(drain(&mut host_rx)
        .iter()
        .all(|e| !matches!(e, ServerEvent::Question(_))));
}

#[tokio::test]
async fn test_full_game_finishes_and_finalizes_record() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(Arc::clone(&store));
    let mut host_rx = router.register(conn(1)).await;
    let mut ada_rx = router.register(conn(2)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;
    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut ada_rx);

    router
        .handle_event(conn(1), ClientEvent::StartGame { pin: pin.clone() })
        .await;

    // The question broadcast reaches host and player, key stripped.
    let ada_events = drain(&mut ada_rx);
    match &ada_events[0] {
        ServerEvent::Question(view) => {
            assert_eq!(view.question_index, 0);
            assert!(view.answer_options.is_some());
        }
        other => panic!("expected question, got {other:?}"),
    }

    router
        .handle_event(
            conn(2),
            ClientEvent::SubmitAnswer {
                pin: pin.clone(),
                question_index: 0,
                answer: Answer::MultipleChoice {
                    option_id: "paris".into(),
                },
            },
        )
        .await;

    // Private result to Ada; the elapsed time is real, so only a range
    // is asserted.
    let ada_events = drain(&mut ada_rx);
    match &ada_events[0] {
        ServerEvent::AnswerResult {
            is_correct,
            points_earned,
            ..
        } => {
            assert!(*is_correct);
            assert!(*points_earned > 900, "near-instant answer: {points_earned}");
        }
        other => panic!("expected answerResult, got {other:?}"),
    }
    // Host saw playerAnswered and scoreUpdate, but no answerResult.
    let host_events = drain(&mut host_rx);
    assert!(host_events
        .iter()
        .any(|e| matches!(e, ServerEvent::PlayerAnswered { .. })));
    assert!(host_events
        .iter()
        .all(|e| !matches!(e, ServerEvent::AnswerResult { .. })));

    router
        .handle_event(conn(1), ClientEvent::NextQuestion { pin: pin.clone() })
        .await;
    router
        .handle_event(
            conn(2),
            ClientEvent::SubmitAnswer {
                pin: pin.clone(),
                question_index: 1,
                answer: Answer::TrueFalse { value: true },
            },
        )
        .await;
    router
        .handle_event(conn(1), ClientEvent::NextQuestion { pin: pin.clone() })
        .await;

    // Both ends of the room got the final leaderboard.
    for rx in [&mut host_rx, &mut ada_rx] {
        let events = drain(rx);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ServerEvent::EndGame { .. })),
            "missing endGame in {events:?}"
        );
    }

    // The pin is released: later joins see unknown_pin.
    assert_eq!(router.session_count().await, 0);
    let mut late_rx = router.register(conn(9)).await;
    router
        .handle_event(
            conn(9),
            ClientEvent::JoinGame {
                pin,
                nickname: "Late".into(),
            },
        )
        .await;
    assert!(matches!(
        &drain(&mut late_rx)[0],
        ServerEvent::JoinError { code, .. } if code == "unknown_pin"
    ));

    // Finalization runs on a detached task; give it a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let record = store.record(RecordId(1)).unwrap();
    assert_eq!(record.status, RecordStatus::Finished);
    assert_eq!(record.results[0].nickname, "Ada");
}

#[tokio::test]
async fn test_host_disconnect_aborts_game() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_rx = router.register(conn(1)).await;
    let mut ada_rx = router.register(conn(2)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;
    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut ada_rx);

    router.handle_disconnect(conn(1)).await;
    router.unregister(conn(1)).await;

    let events = drain(&mut ada_rx);
    assert!(matches!(
        &events[0],
        ServerEvent::GameEndedUnexpectedly { .. }
    ));
    assert_eq!(router.session_count().await, 0);
}

#[tokio::test]
async fn test_player_disconnect_updates_host_roster() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_rx = router.register(conn(1)).await;
    let mut ada_rx = router.register(conn(2)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;
    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin,
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut ada_rx);
    drain(&mut host_rx);

    router.handle_disconnect(conn(2)).await;
    router.unregister(conn(2)).await;

    let events = drain(&mut host_rx);
    match &events[0] {
        ServerEvent::PlayerLeft { players } => assert!(players.is_empty()),
        other => panic!("expected playerLeft, got {other:?}"),
    }
    // The game itself survives a player leaving.
    assert_eq!(router.session_count().await, 1);
}

#[tokio::test]
async fn test_host_cannot_take_a_seat_in_a_second_game() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_a_rx = router.register(conn(1)).await;
    let mut host_b_rx = router.register(conn(2)).await;
    let mut player_rx = router.register(conn(3)).await;

    let pin_a = create_game(&router, conn(1), &mut host_a_rx).await;
    let pin_b = create_game(&router, conn(2), &mut host_b_rx).await;

    router
        .handle_event(
            conn(3),
            ClientEvent::JoinGame {
                pin: pin_a.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut player_rx);

    // Game A's host tries to also play in game B.
    router
        .handle_event(
            conn(1),
            ClientEvent::JoinGame {
                pin: pin_b,
                nickname: "Moonlighter".into(),
            },
        )
        .await;
    assert!(matches!(
        &drain(&mut host_a_rx).pop().unwrap(),
        ServerEvent::JoinError { code, .. } if code == "already_joined"
    ));

    // The host's disconnect still resolves to game A and aborts it.
    router.handle_disconnect(conn(1)).await;
    router.unregister(conn(1)).await;

    let events = drain(&mut player_rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ServerEvent::GameEndedUnexpectedly { .. })),
        "game A's player never heard the host left: {events:?}"
    );
    // A is gone, B survives.
    assert_eq!(router.session_count().await, 1);
    let mut late_rx = router.register(conn(9)).await;
    router
        .handle_event(
            conn(9),
            ClientEvent::JoinGame {
                pin: pin_a,
                nickname: "Late".into(),
            },
        )
        .await;
    assert!(matches!(
        &drain(&mut late_rx)[0],
        ServerEvent::JoinError { code, .. } if code == "unknown_pin"
    ));
}

#[tokio::test]
async fn test_seated_connection_cannot_create_a_game() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with_quiz(store);
    let mut host_rx = router.register(conn(1)).await;
    let mut player_rx = router.register(conn(2)).await;

    let pin = create_game(&router, conn(1), &mut host_rx).await;
    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin,
                nickname: "Ada".into(),
            },
        )
        .await;
    drain(&mut player_rx);

    // Neither the host nor a seated player may open another game.
    for c in [conn(1), conn(2)] {
        router
            .handle_event(
                c,
                ClientEvent::CreateGame {
                    quiz_id: QuizId::new("quiz-1"),
                    host_id: HostId::new("host-2"),
                },
            )
            .await;
    }
    for rx in [&mut host_rx, &mut player_rx] {
        assert!(matches!(
            &drain(rx).pop().unwrap(),
            ServerEvent::GameError { code, .. } if code == "already_joined"
        ));
    }
    assert_eq!(router.session_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_creates_yield_distinct_pins() {
    let store = Arc::new(MemoryStore::new());
    let router = Arc::new(router_with_quiz(store));

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let host = conn(100 + i);
            let mut rx = router.register(host).await;
            router
                .handle_event(
                    host,
                    ClientEvent::CreateGame {
                        quiz_id: QuizId::new("quiz-1"),
                        host_id: HostId::new(format!("host-{i}")),
                    },
                )
                .await;
            match rx.recv().await {
                Some(ServerEvent::GameCreated { pin, .. }) => pin,
                other => panic!("expected gameCreated, got {other:?}"),
            }
        }));
    }

    let mut pins = std::collections::HashSet::new();
    for handle in handles {
        let pin = handle.await.expect("create task should complete");
        assert_eq!(pin.as_str().len(), 6);
        assert!(pins.insert(pin), "pin handed out twice");
    }
    assert_eq!(router.session_count().await, 16);
}

// =========================================================================
// Store failure tolerance
// =========================================================================

/// A store whose every operation fails, standing in for a dead database.
struct FailingStore;

impl SessionStore for FailingStore {
    async fn pin_in_use(&self, _pin: &GamePin) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn create_record(
        &self,
        _quiz_id: &QuizId,
        _host_id: &HostId,
        _pin: &GamePin,
    ) -> Result<RecordId, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn finalize_record(
        &self,
        _record_id: RecordId,
        _results: &[FinalStanding],
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_dead_store_degrades_but_game_runs() {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(QuizId::new("quiz-1"), sample_quiz());
    let router = EventRouter::new(catalog, Arc::new(FailingStore));

    let mut host_rx = router.register(conn(1)).await;
    let mut ada_rx = router.register(conn(2)).await;

    router
        .handle_event(
            conn(1),
            ClientEvent::CreateGame {
                quiz_id: QuizId::new("quiz-1"),
                host_id: HostId::new("host-1"),
            },
        )
        .await;

    // Creation succeeds despite the store being down.
    let pin = created_pin(&drain(&mut host_rx));

    router
        .handle_event(
            conn(2),
            ClientEvent::JoinGame {
                pin: pin.clone(),
                nickname: "Ada".into(),
            },
        )
        .await;
    assert!(matches!(
        &drain(&mut ada_rx)[0],
        ServerEvent::JoinedGame { .. }
    ));

    router
        .handle_event(conn(1), ClientEvent::StartGame { pin: pin.clone() })
        .await;
    router
        .handle_event(conn(1), ClientEvent::NextQuestion { pin: pin.clone() })
        .await;
    router
        .handle_event(conn(1), ClientEvent::NextQuestion { pin })
        .await;

    // The game ran to completion; no record was ever written.
    assert!(drain(&mut ada_rx)
        .iter()
        .any(|e| matches!(e, ServerEvent::EndGame { .. })));
    assert_eq!(router.session_count().await, 0);
}
