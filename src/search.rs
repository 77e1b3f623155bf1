//! Linear substring search over the in-memory category collection.
//!
//! No ranking: match order follows the iteration order of the source
//! collection. The card index is reported so a match can navigate straight
//! to the card in its deck.

use crate::storage::{Card, Category};

/// A category whose title matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub id: String,
    pub title: String,
    pub color: String,
}

/// A card whose label matched, with enough context to re-navigate to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMatch {
    pub category_id: String,
    pub category_title: String,
    pub card: Card,
    /// The card's position within its category.
    pub card_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    pub category_matches: Vec<CategoryMatch>,
    pub card_matches: Vec<CardMatch>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.category_matches.is_empty() && self.card_matches.is_empty()
    }
}

/// Case-insensitive substring match of `query` against category titles and
/// card labels. An empty or whitespace-only query matches nothing.
pub fn search(query: &str, categories: &[Category]) -> SearchResults {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults::default();
    }

    let mut results = SearchResults::default();
    for category in categories {
        if category.title.to_lowercase().contains(&needle) {
            results.category_matches.push(CategoryMatch {
                id: category.id.clone(),
                title: category.title.clone(),
                color: category.color.clone(),
            });
        }
        for (card_index, card) in category.cards.iter().enumerate() {
            if card.label.to_lowercase().contains(&needle) {
                results.card_matches.push(CardMatch {
                    category_id: category.id.clone(),
                    category_title: category.title.clone(),
                    card: card.clone(),
                    card_index,
                });
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(label: &str) -> Card {
        Card {
            id: format!("card-{}", label.to_lowercase()),
            label: label.to_string(),
            image_url: "x".to_string(),
            speak: None,
        }
    }

    fn collection() -> Vec<Category> {
        vec![
            Category {
                id: "animals".to_string(),
                title: "Animals".to_string(),
                color: "#ffd166".to_string(),
                cards: vec![card("Cat"), card("Dog"), card("Caterpillar")],
            },
            Category {
                id: "colors".to_string(),
                title: "Colors".to_string(),
                color: "#ffd6a5".to_string(),
                cards: vec![card("Red"), card("Blue")],
            },
        ]
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(search("", &collection()).is_empty());
        assert!(search("   ", &collection()).is_empty());
    }

    #[test]
    fn test_case_insensitive_card_match_reports_index() {
        let results = search("ca", &collection());
        // "Cat" at index 0 and "Caterpillar" at index 2
        assert_eq!(results.card_matches.len(), 2);
        assert_eq!(results.card_matches[0].card.label, "Cat");
        assert_eq!(results.card_matches[0].card_index, 0);
        assert_eq!(results.card_matches[0].category_id, "animals");
        assert_eq!(results.card_matches[0].category_title, "Animals");
        assert_eq!(results.card_matches[1].card_index, 2);
    }

    #[test]
    fn test_category_title_match() {
        let results = search("COLOR", &collection());
        assert_eq!(results.category_matches.len(), 1);
        assert_eq!(results.category_matches[0].id, "colors");
        // "Colors" the title matches; no card label contains "color"
        assert!(results.card_matches.is_empty());
    }

    #[test]
    fn test_query_is_trimmed_before_matching() {
        let results = search("  cat  ", &collection());
        assert_eq!(results.card_matches.len(), 2);
    }

    #[test]
    fn test_match_order_follows_collection_order() {
        // "l" appears in "Animals", "Colors", "Caterpillar", and "Blue"
        let results = search("l", &collection());
        let titles: Vec<&str> = results
            .category_matches
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Animals", "Colors"]);
        let labels: Vec<&str> = results
            .card_matches
            .iter()
            .map(|m| m.card.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Caterpillar", "Blue"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(search("zebra", &collection()).is_empty());
    }
}
