//! [`RecentReplies`] – anti-repetition window.
//!
//! Keeps the last *N* reply strings a conversation has issued so the selector
//! can steer away from saying the same thing twice in a row.  The window is
//! owned by each conversation's [`Memory`][crate::Memory]; two conversations
//! never see each other's history.
//!
//! # Example
//!
//! ```rust
//! use eliza_memory::RecentReplies;
//!
//! let mut recent = RecentReplies::new(2);
//! recent.record("a");
//! recent.record("b");
//! recent.record("c"); // "a" is evicted
//!
//! assert!(!recent.contains("a"));
//! assert!(recent.contains("b") && recent.contains("c"));
//! ```

use std::collections::VecDeque;

/// Default window size.
pub const RECENT_REPLY_WINDOW: usize = 4;

// ─────────────────────────────────────────────────────────────────────────────
// RecentReplies
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded FIFO of the most recently issued replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentReplies {
    capacity: usize,
    history: VecDeque<String>,
}

impl RecentReplies {
    /// Create an empty window holding at most `capacity` replies.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Record that `reply` was just issued, evicting the oldest entry once the
    /// window is full.
    pub fn record(&mut self, reply: &str) {
        self.history.push_back(reply.to_string());
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// `true` if `reply` is still inside the window.
    pub fn contains(&self, reply: &str) -> bool {
        self.history.iter().any(|r| r == reply)
    }

    /// The most recently issued reply, if any.
    pub fn last(&self) -> Option<&str> {
        self.history.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for RecentReplies {
    fn default() -> Self {
        Self::new(RECENT_REPLY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_holds_four() {
        let recent = RecentReplies::default();
        assert_eq!(recent.capacity(), RECENT_REPLY_WINDOW);
        assert!(recent.is_empty());
    }

    #[test]
    fn oldest_reply_is_evicted_first() {
        let mut recent = RecentReplies::new(4);
        for r in ["one", "two", "three", "four", "five"] {
            recent.record(r);
        }
        assert_eq!(recent.len(), 4);
        assert!(!recent.contains("one"));
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec!["two", "three", "four", "five"]);
    }

    #[test]
    fn last_tracks_most_recent() {
        let mut recent = RecentReplies::new(3);
        assert_eq!(recent.last(), None);
        recent.record("a");
        recent.record("b");
        assert_eq!(recent.last(), Some("b"));
    }

    #[test]
    fn repeated_reply_occupies_several_slots() {
        let mut recent = RecentReplies::new(3);
        recent.record("same");
        recent.record("same");
        recent.record("other");
        recent.record("other");
        assert!(recent.contains("same"), "one copy of 'same' is still in the window");
        recent.record("other");
        assert!(!recent.contains("same"));
    }

    #[test]
    fn clear_empties_window() {
        let mut recent = RecentReplies::default();
        recent.record("a");
        recent.clear();
        assert!(recent.is_empty());
        assert!(!recent.contains("a"));
    }

    #[test]
    fn zero_capacity_never_remembers() {
        let mut recent = RecentReplies::new(0);
        recent.record("a");
        assert!(recent.is_empty());
    }
}
