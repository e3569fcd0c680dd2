//! In-memory catalog and store, for tests and the demo server.

use std::collections::HashMap;
use std::sync::Mutex;

use hotseat_protocol::{
    FinalStanding, GamePin, HostId, QuizId, QuizSnapshot, RecordId,
};

use crate::{
    CatalogError, GameRecord, QuizCatalog, RecordStatus, SessionStore,
    StoreError,
};

/// A [`QuizCatalog`] backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryCatalog {
    quizzes: HashMap<QuizId, QuizSnapshot>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quiz under the given id, replacing any previous one.
    pub fn insert(&mut self, id: QuizId, quiz: QuizSnapshot) {
        self.quizzes.insert(id, quiz);
    }
}

impl QuizCatalog for MemoryCatalog {
    async fn quiz_by_id(
        &self,
        id: &QuizId,
    ) -> Result<QuizSnapshot, CatalogError> {
        self.quizzes
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

/// A [`SessionStore`] backed by a `HashMap`.
///
/// The mutex is a plain `std::sync::Mutex` — every operation is a
/// short map access with no await points inside the critical section.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    next_id: u64,
    records: HashMap<RecordId, GameRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record under `id`, if any. Test hook.
    pub fn record(&self, id: RecordId) -> Option<GameRecord> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .records
            .get(&id)
            .cloned()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    async fn pin_in_use(&self, pin: &GamePin) -> Result<bool, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.records.values().any(|r| &r.pin == pin))
    }

    async fn create_record(
        &self,
        quiz_id: &QuizId,
        host_id: &HostId,
        pin: &GamePin,
    ) -> Result<RecordId, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.next_id += 1;
        let id = RecordId(inner.next_id);
        inner.records.insert(
            id,
            GameRecord::new(pin.clone(), quiz_id.clone(), host_id.clone()),
        );
        Ok(id)
    }

    async fn finalize_record(
        &self,
        record_id: RecordId,
        results: &[FinalStanding],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or(StoreError::RecordNotFound(record_id))?;
        record.status = RecordStatus::Finished;
        record.results = results.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizSnapshot {
        QuizSnapshot {
            title: "Sample".into(),
            questions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_catalog_returns_inserted_quiz() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(QuizId::new("q1"), quiz());

        let found = catalog.quiz_by_id(&QuizId::new("q1")).await.unwrap();
        assert_eq!(found.title, "Sample");
    }

    #[tokio::test]
    async fn test_catalog_missing_quiz_is_not_found() {
        let catalog = MemoryCatalog::new();
        let result = catalog.quiz_by_id(&QuizId::new("nope")).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_create_then_finalize() {
        let store = MemoryStore::new();
        let id = store
            .create_record(
                &QuizId::new("q1"),
                &HostId::new("h1"),
                &GamePin::new("111111"),
            )
            .await
            .unwrap();

        let record = store.record(id).unwrap();
        assert_eq!(record.status, RecordStatus::Lobby);
        assert!(record.created_at > 0);

        let results = vec![FinalStanding {
            nickname: "Alex".into(),
            final_score: 500,
        }];
        store.finalize_record(id, &results).await.unwrap();

        let record = store.record(id).unwrap();
        assert_eq!(record.status, RecordStatus::Finished);
        assert_eq!(record.results, results);
    }

    #[tokio::test]
    async fn test_pin_in_use_reflects_records() {
        let store = MemoryStore::new();
        let pin = GamePin::new("222222");
        assert!(!store.pin_in_use(&pin).await.unwrap());

        store
            .create_record(&QuizId::new("q"), &HostId::new("h"), &pin)
            .await
            .unwrap();
        assert!(store.pin_in_use(&pin).await.unwrap());
    }

    #[tokio::test]
    async fn test_finalize_unknown_record_fails() {
        let store = MemoryStore::new();
        let result = store.finalize_record(RecordId(99), &[]).await;
        assert!(matches!(result, Err(StoreError::RecordNotFound(_))));
    }
}
