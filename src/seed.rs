//! First-run seed data: the default categories shown before a user has
//! created anything, and the fallback when neither the remote nor the local
//! store has a collection.

use crate::storage::{Card, Category};

fn card(id: &str, label: &str, image_url: &str, speak: Option<&str>) -> Card {
    Card {
        id: id.to_string(),
        label: label.to_string(),
        image_url: image_url.to_string(),
        speak: speak.map(str::to_string),
    }
}

/// The built-in starter collection: Alphabet, Animals, Numbers, Colors.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category {
            id: "alphabet".to_string(),
            title: "Alphabet".to_string(),
            color: "#ff7aa2".to_string(),
            cards: vec![
                card(
                    "alpha-a",
                    "A",
                    "https://via.placeholder.com/600x400?text=A",
                    Some("A"),
                ),
                card(
                    "alpha-b",
                    "B",
                    "https://via.placeholder.com/600x400?text=B",
                    Some("B"),
                ),
            ],
        },
        Category {
            id: "animals".to_string(),
            title: "Animals".to_string(),
            color: "#ffd166".to_string(),
            cards: vec![
                card(
                    "a-cat",
                    "Cat",
                    "https://images.unsplash.com/photo-1518791841217-8f162f1e1131?w=1200&q=80",
                    Some("Cat"),
                ),
                card(
                    "a-dog",
                    "Dog",
                    "https://images.unsplash.com/photo-1518717758536-85ae29035b6d?w=1200&q=80",
                    Some("Dog"),
                ),
            ],
        },
        Category {
            id: "numbers".to_string(),
            title: "Numbers".to_string(),
            color: "#4cc9f0".to_string(),
            cards: vec![
                card(
                    "num-0",
                    "0",
                    "https://via.placeholder.com/600x400?text=0",
                    Some("Zero"),
                ),
                card(
                    "num-1",
                    "1",
                    "https://via.placeholder.com/600x400?text=1",
                    Some("One"),
                ),
            ],
        },
        Category {
            id: "colors".to_string(),
            title: "Colors".to_string(),
            color: "#ffd6a5".to_string(),
            cards: vec![
                // Inline-encoded image: color swatches need no remote fetch.
                card(
                    "c-red",
                    "Red",
                    "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==",
                    Some("Red"),
                ),
                card(
                    "c-blue",
                    "Blue",
                    "https://via.placeholder.com/600x400/0000ff?text=Blue",
                    Some("Blue"),
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = default_categories();
        let ids: HashSet<_> = seed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), seed.len());
    }

    #[test]
    fn test_seed_carries_an_inline_encoded_image() {
        let seed = default_categories();
        let colors = seed.iter().find(|c| c.id == "colors").unwrap();
        assert!(colors
            .cards
            .iter()
            .any(|c| c.image_url.starts_with("data:image/")));
    }

    #[test]
    fn test_seed_categories_have_cards() {
        for category in default_categories() {
            assert!(!category.cards.is_empty(), "{} has no cards", category.id);
        }
    }
}
