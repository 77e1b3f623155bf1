use serde::{Deserialize, Serialize};

// ============================================================================
// Data Model
// ============================================================================

/// One learnable unit: an image, a label, and an optional spoken-text
/// override.
///
/// `id` is assigned by the writer at creation time and never reassigned.
/// It only needs to be unique within its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub label: String,
    /// Remote URL or inline-encoded (`data:`) image.
    pub image_url: String,
    /// Override for the spoken text; `label` is spoken when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
}

impl Card {
    /// Text handed to the pronunciation capability.
    pub fn spoken_text(&self) -> &str {
        self.speak.as_deref().unwrap_or(&self.label)
    }
}

/// A named, colored grouping of cards.
///
/// `id` is a slug derived from the title and unique across the collection.
/// Card order is significant: it determines navigation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    /// Display color token, e.g. a hex string.
    pub color: String,
    /// Never null on the wire; an absent array deserializes as empty.
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Broadcast after every successful local write so all open views converge
/// without polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    /// Monotonic version marker for the stored collection.
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_text_defaults_to_label() {
        let card = Card {
            id: "num-0".to_string(),
            label: "0".to_string(),
            image_url: "https://example.com/0.png".to_string(),
            speak: None,
        };
        assert_eq!(card.spoken_text(), "0");
    }

    #[test]
    fn test_spoken_text_uses_override() {
        let card = Card {
            id: "num-0".to_string(),
            label: "0".to_string(),
            image_url: "https://example.com/0.png".to_string(),
            speak: Some("Zero".to_string()),
        };
        assert_eq!(card.spoken_text(), "Zero");
    }

    #[test]
    fn test_card_wire_names_are_camel_case() {
        let card = Card {
            id: "a-cat".to_string(),
            label: "Cat".to_string(),
            image_url: "https://example.com/cat.jpg".to_string(),
            speak: None,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("image_url").is_none());
        // Absent speak is omitted, not serialized as null
        assert!(json.get("speak").is_none());
    }

    #[test]
    fn test_category_missing_cards_deserializes_as_empty() {
        let cat: Category =
            serde_json::from_str(r##"{"id":"animals","title":"Animals","color":"#ffd166"}"##)
                .unwrap();
        assert!(cat.cards.is_empty());
    }
}
