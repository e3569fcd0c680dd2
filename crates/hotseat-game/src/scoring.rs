//! Pure answer evaluation and the latency-based point curve.
//!
//! Nothing here touches session state — evaluation takes the question's
//! key and the submitted answer, scoring takes the server-measured
//! elapsed time. Clients never supply their own timing.

use std::collections::HashMap;
use std::time::Duration;

use hotseat_protocol::{Answer, QuestionKind};

/// Points for an instant correct answer.
pub const MAX_POINTS: u32 = 1000;

/// Computes the points for a correct answer.
///
/// `points = max(0, floor(MAX_POINTS - elapsed * MAX_POINTS / limit))`:
/// a full-speed answer earns close to [`MAX_POINTS`], the value decays
/// linearly to zero at the time limit and stays there — answering after
/// the advisory countdown is allowed but worthless.
pub fn points(elapsed: Duration, time_limit_secs: u32) -> u32 {
    let limit = f64::from(time_limit_secs.max(1));
    let per_second = f64::from(MAX_POINTS) / limit;
    let raw = f64::from(MAX_POINTS) - elapsed.as_secs_f64() * per_second;
    raw.max(0.0).floor() as u32
}

/// Evaluates a submitted answer against a question's key.
///
/// A submission whose variant doesn't match the question's type is
/// simply incorrect — the caller still burns the player's attempt.
pub fn evaluate(kind: &QuestionKind, answer: &Answer) -> bool {
    match (kind, answer) {
        (
            QuestionKind::MultipleChoice { options },
            Answer::MultipleChoice { option_id },
        ) => options.iter().any(|o| o.is_correct && &o.id == option_id),

        (QuestionKind::TrueFalse { answer }, Answer::TrueFalse { value }) => {
            answer == value
        }

        (QuestionKind::FillBlank { answer }, Answer::FillBlank { text }) => {
            normalize(answer) == normalize(text)
        }

        (QuestionKind::Matching { pairs }, Answer::Matching { pairs: submitted }) => {
            matching_correct(pairs, submitted)
        }

        // Tag mismatch: wrong kind of answer for this question.
        _ => false,
    }
}

/// All-or-nothing matching check: same cardinality, and every submitted
/// term maps to its key definition. Each key pair may be consumed at
/// most once, so duplicated terms in the submission fail.
fn matching_correct(
    key: &[hotseat_protocol::MatchingPair],
    submitted: &[hotseat_protocol::MatchingPair],
) -> bool {
    if key.len() != submitted.len() {
        return false;
    }

    let mut remaining: HashMap<String, String> = key
        .iter()
        .map(|p| (normalize(&p.term), normalize(&p.definition)))
        .collect();

    submitted.iter().all(|pair| {
        remaining.remove(&normalize(&pair.term))
            == Some(normalize(&pair.definition))
    })
}

/// Comparison normalization for free-form input: trimmed, lowercased.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
