//! Navigation state for the card viewer: index bounds, wraparound, random
//! jumps, and swipe classification.

use rand::Rng;

use crate::speech::{Speech, SpeechError};
use crate::storage::Card;

/// Minimum horizontal displacement before a drag counts as a swipe.
pub const SWIPE_MIN_HORIZONTAL: f32 = 50.0;
/// Maximum vertical displacement a swipe may have; more than this is a
/// scroll, not navigation.
pub const SWIPE_MAX_VERTICAL: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Next,
    Previous,
}

/// Classify a completed drag by its displacement. Returns `None` for
/// vertical drags and taps, which the viewer ignores.
pub fn classify_swipe(dx: f32, dy: f32) -> Option<Nav> {
    if dx.abs() > SWIPE_MIN_HORIZONTAL && dy.abs() < SWIPE_MAX_VERTICAL {
        // Dragging leftward pulls the next card into view.
        Some(if dx < 0.0 { Nav::Next } else { Nav::Previous })
    } else {
        None
    }
}

// ============================================================================
// Viewer State
// ============================================================================

/// Current position within one category's deck.
///
/// Navigation wraps at both boundaries rather than clamping: the card after
/// the last is the first, and vice versa. An empty deck makes every move a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    index: usize,
    total: usize,
}

impl ViewerState {
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    /// Start at a requested index, clamped into `[0, total)`. Out-of-range
    /// deep links land on the nearest valid card instead of failing.
    pub fn with_index(total: usize, requested: usize) -> Self {
        let index = if total == 0 {
            0
        } else {
            requested.min(total - 1)
        };
        Self { index, total }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// One-based position and total, for "3 / 12" style counters.
    pub fn counter(&self) -> (usize, usize) {
        if self.total == 0 {
            (0, 0)
        } else {
            (self.index + 1, self.total)
        }
    }

    /// Move forward one card, wrapping from the last to the first.
    pub fn next(&mut self) {
        if self.total == 0 {
            return;
        }
        self.index = (self.index + 1) % self.total;
    }

    /// Move back one card, wrapping from the first to the last.
    pub fn previous(&mut self) {
        if self.total == 0 {
            return;
        }
        self.index = if self.index == 0 {
            self.total - 1
        } else {
            self.index - 1
        };
    }

    pub fn apply(&mut self, nav: Nav) {
        match nav {
            Nav::Next => self.next(),
            Nav::Previous => self.previous(),
        }
    }

    /// Jump to a uniformly random card. May land on the current one.
    pub fn random(&mut self) {
        self.random_with(&mut rand::rng());
    }

    pub fn random_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.total == 0 {
            return;
        }
        self.index = rng.random_range(0..self.total);
    }

    /// The deck changed size (a card was appended in another view, or the
    /// collection refreshed). Keeps the current index valid.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if total == 0 {
            self.index = 0;
        } else if self.index >= total {
            self.index = total - 1;
        }
    }
}

/// Speak a card's text through the injected capability. Unavailability
/// comes back as an error value for the caller to report; it never panics.
pub fn pronounce(speech: &dyn Speech, card: &Card) -> Result<(), SpeechError> {
    speech.speak(card.spoken_text())
}
