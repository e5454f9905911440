//! Speech bubbles.
//!
//! A bubble appears over an avatar when a message is attributed to it
//! and clears a fixed number of *wall-clock* seconds later: the hold is
//! real time, deliberately independent of playback speed. Each agent
//! holds at most one pending clear; a newer message supersedes the old
//! deadline rather than stacking a second timer.

use crate::roster::AgentId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a bubble stays up after attribution.
pub const BUBBLE_HOLD: Duration = Duration::from_secs(5);

/// Display text is cut beyond this many characters.
pub const BUBBLE_TEXT_MAX_CHARS: usize = 220;

/// Soft cap on bubble width in scene units.
pub const BUBBLE_WIDTH_MAX: f64 = 5.8;

const BUBBLE_WIDTH_BASE: f64 = 1.6;
const BUBBLE_WIDTH_PER_CHAR: f64 = 0.06;

/// Bubble width derived from text length, capped so arbitrarily long
/// messages cannot grow without bound.
pub fn bubble_width(text: &str) -> f64 {
    (BUBBLE_WIDTH_PER_CHAR * text.chars().count() as f64 + BUBBLE_WIDTH_BASE)
        .min(BUBBLE_WIDTH_MAX)
}

/// Truncates display text past the cap, marking the cut with an
/// ellipsis. Short text is borrowed untouched.
pub fn bubble_text(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= BUBBLE_TEXT_MAX_CHARS {
        return Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(BUBBLE_TEXT_MAX_CHARS).collect();
    cut.push('…');
    Cow::Owned(cut)
}

/// A bubble currently shown over one agent.
#[derive(Debug, Clone)]
pub struct Bubble {
    /// Full message text; truncation happens at render time.
    pub text: String,

    /// Wall-clock deadline after which the bubble clears.
    pub clear_at: Instant,
}

impl Bubble {
    /// Render width for this bubble's text.
    pub fn width(&self) -> f64 {
        bubble_width(&self.text)
    }

    /// Render text, truncated with an ellipsis when oversized.
    pub fn display_text(&self) -> Cow<'_, str> {
        bubble_text(&self.text)
    }
}

/// Pending-clear bookkeeping: at most one bubble per agent.
#[derive(Debug, Default)]
pub struct BubbleBoard {
    bubbles: HashMap<AgentId, Bubble>,
}

impl BubbleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a bubble for `agent`, replacing any pending clear for that
    /// agent with a fresh deadline (last message wins).
    pub fn show(&mut self, agent: AgentId, text: impl Into<String>, now: Instant) {
        self.bubbles.insert(
            agent,
            Bubble {
                text: text.into(),
                clear_at: now + BUBBLE_HOLD,
            },
        );
    }

    /// Clears expired bubbles, returning the agents whose bubble went
    /// away so the caller can drop their activity flag.
    pub fn sweep(&mut self, now: Instant) -> Vec<AgentId> {
        let expired: Vec<AgentId> = self
            .bubbles
            .iter()
            .filter(|(_, b)| now >= b.clear_at)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.bubbles.remove(id);
        }
        expired
    }

    /// The bubble currently shown for `agent`, if any.
    pub fn get(&self, agent: &AgentId) -> Option<&Bubble> {
        self.bubbles.get(agent)
    }

    /// All live bubbles, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &Bubble)> {
        self.bubbles.iter()
    }

    /// Drops every pending clear, e.g. on session teardown or reset.
    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn alice() -> AgentId {
        AgentId::new("alice")
    }

    #[test]
    fn test_width_formula_and_cap() {
        assert_relative_eq!(bubble_width(""), 1.6);
        assert_relative_eq!(bubble_width("hi"), 0.06 * 2.0 + 1.6);

        let long = "x".repeat(500);
        assert_relative_eq!(bubble_width(&long), BUBBLE_WIDTH_MAX);
    }

    #[test]
    fn test_truncation_adds_ellipsis() {
        let short = "hello";
        assert!(matches!(bubble_text(short), Cow::Borrowed(_)));

        let long = "a".repeat(300);
        let cut = bubble_text(&long);
        assert_eq!(cut.chars().count(), BUBBLE_TEXT_MAX_CHARS + 1);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Multi-byte characters must not be split mid-codepoint.
        let long = "é".repeat(300);
        let cut = bubble_text(&long);
        assert_eq!(cut.chars().count(), BUBBLE_TEXT_MAX_CHARS + 1);
    }

    #[test]
    fn test_bubble_clears_after_hold() {
        let mut board = BubbleBoard::new();
        let t0 = Instant::now();
        board.show(alice(), "hi", t0);

        assert!(board.sweep(t0 + Duration::from_secs(4)).is_empty());
        assert!(board.get(&alice()).is_some());

        let expired = board.sweep(t0 + BUBBLE_HOLD);
        assert_eq!(expired, vec![alice()]);
        assert!(board.get(&alice()).is_none());
    }

    #[test]
    fn test_newer_message_supersedes_pending_clear() {
        let mut board = BubbleBoard::new();
        let t0 = Instant::now();
        board.show(alice(), "first", t0);

        // Second message three seconds in: the original deadline at
        // t0+5s must no longer clear anything.
        board.show(alice(), "second", t0 + Duration::from_secs(3));
        assert!(board.sweep(t0 + Duration::from_secs(5)).is_empty());

        let bubble = board.get(&alice()).unwrap();
        assert_eq!(bubble.text, "second");

        let expired = board.sweep(t0 + Duration::from_secs(8));
        assert_eq!(expired, vec![alice()]);
    }

    #[test]
    fn test_one_bubble_per_agent() {
        let mut board = BubbleBoard::new();
        let t0 = Instant::now();
        board.show(alice(), "first", t0);
        board.show(alice(), "second", t0);
        assert_eq!(board.iter().count(), 1);
    }

    proptest! {
        #[test]
        fn prop_width_never_exceeds_cap(text in ".*") {
            prop_assert!(bubble_width(&text) <= BUBBLE_WIDTH_MAX + 1e-12);
            prop_assert!(bubble_width(&text) >= 1.6 - 1e-12);
        }

        #[test]
        fn prop_display_text_bounded(text in ".*") {
            let shown = bubble_text(&text);
            prop_assert!(shown.chars().count() <= BUBBLE_TEXT_MAX_CHARS + 1);
        }
    }
}
