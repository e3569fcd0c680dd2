//! Trivia Night: a demo Hotseat server with one canned quiz.
//!
//! Run it, then drive it with any WebSocket client:
//!
//! ```text
//! cargo run -p trivia-night
//! # host:   {"type":"createGame","quizId":"trivia-night","hostId":"demo-host"}
//! # player: {"type":"joinGame","pin":"<pin>","nickname":"Ada"}
//! # host:   {"type":"startGame","pin":"<pin>"}
//! ```

use hotseat::prelude::*;
use hotseat_protocol::{
    AnswerOption, MatchingPair, Question, QuestionKind,
};
use hotseat_store::{MemoryCatalog, MemoryStore};

fn trivia_quiz() -> QuizSnapshot {
    QuizSnapshot {
        title: "Trivia Night".into(),
        questions: vec![
            Question {
                question_text: "Which planet is closest to the sun?".into(),
                image_url: None,
                time_limit_secs: 20,
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        AnswerOption {
                            id: "mercury".into(),
                            text: "Mercury".into(),
                            is_correct: true,
                        },
                        AnswerOption {
                            id: "venus".into(),
                            text: "Venus".into(),
                            is_correct: false,
                        },
                        AnswerOption {
                            id: "mars".into(),
                            text: "Mars".into(),
                            is_correct: false,
                        },
                    ],
                },
            },
            Question {
                question_text: "The Great Wall of China is visible from the moon.".into(),
                image_url: None,
                time_limit_secs: 10,
                kind: QuestionKind::TrueFalse { answer: false },
            },
            Question {
                question_text: "The chemical symbol Au stands for ___.".into(),
                image_url: None,
                time_limit_secs: 15,
                kind: QuestionKind::FillBlank { answer: "gold".into() },
            },
            Question {
                question_text: "Match each country to its capital.".into(),
                image_url: None,
                time_limit_secs: 30,
                kind: QuestionKind::Matching {
                    pairs: vec![
                        MatchingPair {
                            term: "Japan".into(),
                            definition: "Tokyo".into(),
                        },
                        MatchingPair {
                            term: "Kenya".into(),
                            definition: "Nairobi".into(),
                        },
                        MatchingPair {
                            term: "Peru".into(),
                            definition: "Lima".into(),
                        },
                    ],
                },
            },
        ],
    }
}

#[tokio::main]
async fn main() -> Result<(), HotseatError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut catalog = MemoryCatalog::new();
    catalog.insert(QuizId::new("trivia-night"), trivia_quiz());

    let server = HotseatServerBuilder::new()
        .bind("127.0.0.1:8080")
        .build(catalog, MemoryStore::new())
        .await?;

    tracing::info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        "trivia night is on, quiz id: trivia-night"
    );
    server.run().await
}
