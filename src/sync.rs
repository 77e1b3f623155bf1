//! Sync/fallback orchestrator: one consistent API for category and card
//! operations that uses the remote store whenever it is reachable and the
//! local store when it is not, keeping local as a write-through cache of
//! the last good remote state.
//!
//! Within one call the remote attempt always precedes the local fallback;
//! the two are never attempted concurrently. Reads never fail on a
//! remote-unreachable condition; they degrade. There are no retries and
//! no background reconciliation: data created offline is not pushed
//! upstream when the remote recovers.

use rand::distr::Alphanumeric;
use rand::Rng;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::remote::RemoteClient;
use crate::search::{self, SearchResults};
use crate::storage::{Card, Category, LocalStore, StoreChange};
use crate::util::slugify;

/// Color assigned when the caller does not pick one.
const DEFAULT_COLOR: &str = "#ffd166";

#[derive(Debug, Error)]
pub enum SyncError {
    /// Neither the remote nor the local store has the category.
    #[error("Category '{0}' not found")]
    NotFound(String),
    /// Caller-supplied data failed a precondition; no network attempt was
    /// made.
    #[error("{0}")]
    Validation(String),
}

/// Input for [`Catalog::create_category`]. Cards always start empty.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub color: Option<String>,
}

/// Input for [`Catalog::append_card`]. The card id is generated by the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub label: String,
    pub image_url: String,
    pub speak: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

pub struct Catalog {
    remote: RemoteClient,
    local: LocalStore,
}

impl Catalog {
    pub fn new(remote: RemoteClient, local: LocalStore) -> Self {
        Self { remote, local }
    }

    /// The full category collection.
    ///
    /// Remote is authoritative whenever reachable: a successful read is
    /// written through to the local store before being returned. On any
    /// remote failure, or when the remote has no collection yet, the
    /// local store answers instead, with no reconciliation attempted.
    pub async fn categories(&self) -> Vec<Category> {
        match self.remote.list_categories().await {
            Ok(Some(categories)) => {
                self.local.write_all(&categories).await;
                categories
            }
            Ok(None) => {
                tracing::debug!("Remote has no category collection yet, answering from local store");
                self.local.read_all().await
            }
            Err(e) => {
                tracing::debug!(error = %e, "Remote unreachable, answering from local store");
                self.local.read_all().await
            }
        }
    }

    /// One category by id, or `None` when neither store has it.
    pub async fn category(&self, id: &str) -> Option<Category> {
        match self.remote.get_category(id).await {
            Ok(found @ Some(_)) => found,
            Ok(None) => self.categories().await.into_iter().find(|c| c.id == id),
            Err(e) => {
                tracing::debug!(error = %e, id, "Remote unreachable, scanning local store");
                self.local.read_all().await.into_iter().find(|c| c.id == id)
            }
        }
    }

    /// Create a category with a slug id derived from the title.
    ///
    /// Remote success merges the server's category into the local cache.
    /// Any remote failure, including a duplicate-id conflict, falls back
    /// to a purely local create, where a colliding id gets an incrementing
    /// numeric suffix until unique. The returned category always carries
    /// the final id; nothing existing is ever overwritten silently.
    pub async fn create_category(&self, new: NewCategory) -> Result<Category, SyncError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(SyncError::Validation(
                "Category title cannot be empty".to_string(),
            ));
        }
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(SyncError::Validation(
                "Category title needs at least one letter or digit".to_string(),
            ));
        }

        let category = Category {
            id: slug,
            title: title.to_string(),
            color: new.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            cards: Vec::new(),
        };

        match self.remote.create_category(&category).await {
            Ok(created) => {
                let mut collection = self.local.read_all().await;
                merge_category(&mut collection, created.clone());
                self.local.write_all(&collection).await;
                Ok(created)
            }
            Err(e) => {
                tracing::debug!(error = %e, id = %category.id, "Remote create failed, creating category locally");
                let mut collection = self.local.read_all().await;
                let mut category = category;
                category.id = disambiguate_id(&category.id, &collection);
                collection.insert(0, category.clone());
                self.local.write_all(&collection).await;
                Ok(category)
            }
        }
    }

    /// Append a card to a category.
    ///
    /// The card id is generated here from the category id, the current
    /// timestamp, and a random suffix. Remote success replaces the cached
    /// category with the server's version (the server owns the final card
    /// list). On any remote failure the card is appended to the local
    /// copy; if the category is absent locally too there is nothing to
    /// append to and the call fails with [`SyncError::NotFound`].
    pub async fn append_card(
        &self,
        category_id: &str,
        new: NewCard,
    ) -> Result<Category, SyncError> {
        let label = new.label.trim();
        if label.is_empty() {
            return Err(SyncError::Validation(
                "Card label cannot be empty".to_string(),
            ));
        }

        let card = Card {
            id: generate_card_id(category_id),
            label: label.to_string(),
            image_url: new.image_url,
            speak: new.speak,
        };

        match self.remote.append_card(category_id, card.clone()).await {
            Ok(updated) => {
                let mut collection = self.local.read_all().await;
                merge_category(&mut collection, updated.clone());
                self.local.write_all(&collection).await;
                Ok(updated)
            }
            Err(e) => {
                tracing::debug!(error = %e, category = category_id, "Remote append failed, appending card locally");
                let mut collection = self.local.read_all().await;
                let Some(category) = collection.iter_mut().find(|c| c.id == category_id) else {
                    return Err(SyncError::NotFound(category_id.to_string()));
                };
                category.cards.push(card);
                let updated = category.clone();
                self.local.write_all(&collection).await;
                Ok(updated)
            }
        }
    }

    /// Search the collection as currently visible (remote-first, local
    /// fallback).
    pub async fn search(&self, query: &str) -> SearchResults {
        search::search(query, &self.categories().await)
    }

    /// Change notifications from the local store: one per successful
    /// write, shared by every open view.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.local.subscribe()
    }
}

/// Replace the category with a matching id, or prepend it.
fn merge_category(collection: &mut Vec<Category>, category: Category) {
    match collection.iter_mut().find(|c| c.id == category.id) {
        Some(existing) => *existing = category,
        None => collection.insert(0, category),
    }
}

/// Append an incrementing numeric suffix until the id is unique within the
/// collection. The loop is bounded by the collection size: at most
/// `len + 1` candidates can collide.
fn disambiguate_id(id: &str, collection: &[Category]) -> String {
    let taken = |candidate: &str| collection.iter().any(|c| c.id == candidate);
    if !taken(id) {
        return id.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{id}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Card ids only need to be unique within the call's lifetime: category id
/// plus millisecond timestamp plus a random suffix is plenty.
fn generate_card_id(category_id: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!(
        "card-{}-{}-{}",
        category_id,
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: &str) -> Category {
        Category {
            id: id.to_string(),
            title: id.to_string(),
            color: "#ffd166".to_string(),
            cards: Vec::new(),
        }
    }

    #[test]
    fn test_merge_replaces_existing_in_place() {
        let mut collection = vec![cat("alphabet"), cat("animals")];
        let mut replacement = cat("animals");
        replacement.title = "Wild Animals".to_string();

        merge_category(&mut collection, replacement);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection[1].title, "Wild Animals");
    }

    #[test]
    fn test_merge_prepends_new() {
        let mut collection = vec![cat("alphabet")];
        merge_category(&mut collection, cat("animals"));
        assert_eq!(collection[0].id, "animals");
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_disambiguate_passes_through_free_id() {
        let collection = vec![cat("alphabet")];
        assert_eq!(disambiguate_id("animals", &collection), "animals");
    }

    #[test]
    fn test_disambiguate_skips_taken_suffixes() {
        let collection = vec![cat("animals"), cat("animals-1"), cat("animals-2")];
        assert_eq!(disambiguate_id("animals", &collection), "animals-3");
    }

    #[test]
    fn test_card_ids_do_not_collide_within_a_burst() {
        let ids: Vec<String> = (0..50).map(|_| generate_card_id("animals")).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        assert!(ids[0].starts_with("card-animals-"));
    }
}
