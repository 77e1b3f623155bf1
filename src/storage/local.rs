use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use super::db::Database;
use super::types::{Category, StoreChange};

/// Slot holding the JSON-serialized category collection.
pub const CATEGORIES_SLOT: &str = "categories";

/// Change notifications are tiny version markers; a small buffer is plenty
/// for the handful of views a session has open.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

// ============================================================================
// Local Store Adapter
// ============================================================================

/// The durable fallback/cache for the category collection.
///
/// Reads never fail: an empty or malformed slot degrades to the default
/// collection. Writes replace the collection wholesale and, on success,
/// broadcast a [`StoreChange`] so every open view refreshes; persistence
/// failures are logged and swallowed rather than crashing the caller.
#[derive(Clone)]
pub struct LocalStore {
    db: Database,
    defaults: Arc<Vec<Category>>,
    changes: broadcast::Sender<StoreChange>,
    revision: Arc<AtomicU64>,
}

impl LocalStore {
    pub fn new(db: Database, defaults: Vec<Category>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            db,
            defaults: Arc::new(defaults),
            changes,
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The last-known full collection.
    ///
    /// Absence degrades to defaults: a slot that was never written, holds
    /// corrupt JSON, or holds an empty array all yield the default
    /// collection instead of an error.
    pub async fn read_all(&self) -> Vec<Category> {
        let raw = match self.db.get_slot(CATEGORIES_SLOT).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.defaults(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read category slot, using defaults");
                return self.defaults();
            }
        };

        match serde_json::from_str::<Vec<Category>>(&raw) {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => self.defaults(),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed category slot, using defaults");
                self.defaults()
            }
        }
    }

    /// Replace the stored collection wholesale.
    ///
    /// The change notification fires only after the write actually lands.
    pub async fn write_all(&self, categories: &[Category]) {
        let raw = match serde_json::to_string(categories) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize category collection");
                return;
            }
        };

        if let Err(e) = self.db.set_slot(CATEGORIES_SLOT, &raw).await {
            tracing::warn!(error = %e, "Failed to persist category collection");
            return;
        }

        let revision = self.revision.fetch_add(1, Ordering::Relaxed) + 1;
        // Fire-and-forget: send only errors when no view is subscribed.
        let _ = self.changes.send(StoreChange { revision });
        tracing::debug!(revision, count = categories.len(), "Category collection persisted");
    }

    /// Subscribe to change notifications. Every successful `write_all`
    /// produces one [`StoreChange`].
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn defaults(&self) -> Vec<Category> {
        self.defaults.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Card;

    fn sample_category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            title: id.to_uppercase(),
            color: "#ffd166".to_string(),
            cards: vec![Card {
                id: format!("{id}-1"),
                label: "Cat".to_string(),
                image_url: "https://example.com/cat.jpg".to_string(),
                speak: None,
            }],
        }
    }

    async fn test_store(defaults: Vec<Category>) -> LocalStore {
        let db = Database::open(":memory:").await.unwrap();
        LocalStore::new(db, defaults)
    }

    #[tokio::test]
    async fn test_read_all_empty_store_returns_defaults() {
        let defaults = vec![sample_category("animals")];
        let store = test_store(defaults.clone()).await;
        assert_eq!(store.read_all().await, defaults);
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let store = test_store(vec![sample_category("animals")]).await;
        let written = vec![sample_category("numbers"), sample_category("colors")];
        store.write_all(&written).await;
        assert_eq!(store.read_all().await, written);
    }

    #[tokio::test]
    async fn test_malformed_slot_degrades_to_defaults() {
        let defaults = vec![sample_category("animals")];
        let db = Database::open(":memory:").await.unwrap();
        db.set_slot(CATEGORIES_SLOT, "{not json").await.unwrap();
        let store = LocalStore::new(db, defaults.clone());
        assert_eq!(store.read_all().await, defaults);
    }

    #[tokio::test]
    async fn test_empty_array_slot_degrades_to_defaults() {
        let defaults = vec![sample_category("animals")];
        let db = Database::open(":memory:").await.unwrap();
        db.set_slot(CATEGORIES_SLOT, "[]").await.unwrap();
        let store = LocalStore::new(db, defaults.clone());
        assert_eq!(store.read_all().await, defaults);
    }

    #[tokio::test]
    async fn test_write_all_notifies_subscribers() {
        let store = test_store(vec![]).await;
        let mut rx = store.subscribe();

        store.write_all(&[sample_category("animals")]).await;
        let change = rx.recv().await.unwrap();
        assert_eq!(change.revision, 1);

        store.write_all(&[sample_category("animals")]).await;
        let change = rx.recv().await.unwrap();
        assert_eq!(change.revision, 2);
    }

    #[tokio::test]
    async fn test_write_all_without_subscribers_does_not_panic() {
        let store = test_store(vec![]).await;
        store.write_all(&[sample_category("animals")]).await;
    }
}
