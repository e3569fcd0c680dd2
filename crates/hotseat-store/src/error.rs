//! Error types for the catalog and store seams.

use hotseat_protocol::{QuizId, RecordId};

/// Errors from the quiz catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No quiz exists under the given id.
    #[error("quiz {0} not found")]
    NotFound(QuizId),

    /// The backing service could not be reached or answered badly.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the given id.
    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    /// The backing service could not be reached or answered badly.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
