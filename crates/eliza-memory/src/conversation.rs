//! Conversation memory.
//!
//! One [`Memory`] exists per conversation.  It is created empty, mutated turn
//! by turn by the responder, and dropped with the conversation.  Nothing here
//! outlives the process.

use std::collections::{BTreeMap, BTreeSet};

use eliza_types::{Feeling, TopicTag};

use crate::recent::RecentReplies;

/// Mutable record owned by a single conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memory {
    /// Acquired user name.  Once set it only goes away through [`Memory::reset`].
    pub name: Option<String>,
    /// Most recently mentioned kinship term.
    pub last_relation: Option<String>,
    /// Kinship term → number of mentions so far.
    pub kinship_mentions: BTreeMap<String, u32>,
    /// Topics touched on during the conversation.
    pub topic_tags: BTreeSet<TopicTag>,
    /// Last observed feeling polarity.
    pub mood: Option<Feeling>,
    /// Remembered free-text facts, insertion order, no exact duplicates.
    pub facts: Vec<String>,
    /// This conversation's anti-repetition window.
    pub recent: RecentReplies,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a name has been acquired.
    pub fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Store `name` if no name is held yet.
    ///
    /// Returns `true` when the name was stored.  An already-named memory is
    /// left untouched.
    pub fn acquire_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.is_named() || name.is_empty() {
            return false;
        }
        self.name = Some(name.to_string());
        true
    }

    /// Count one more mention of `relation` and make it the last relation.
    ///
    /// Returns the updated mention count.
    pub fn note_relation(&mut self, relation: &str) -> u32 {
        let count = self.kinship_mentions.entry(relation.to_string()).or_insert(0);
        *count += 1;
        self.last_relation = Some(relation.to_string());
        *count
    }

    /// Number of times `relation` has been mentioned.
    pub fn mentions(&self, relation: &str) -> u32 {
        self.kinship_mentions.get(relation).copied().unwrap_or(0)
    }

    pub fn add_topics(&mut self, tags: impl IntoIterator<Item = TopicTag>) {
        self.topic_tags.extend(tags);
    }

    pub fn set_mood(&mut self, feeling: Feeling) {
        self.mood = Some(feeling);
    }

    /// Remember a fact.  Blank text and exact duplicates are ignored.
    ///
    /// Returns `true` when the fact was new.
    pub fn remember(&mut self, fact: &str) -> bool {
        let fact = fact.trim();
        if fact.is_empty() || self.facts.iter().any(|f| f == fact) {
            return false;
        }
        self.facts.push(fact.to_string());
        true
    }

    /// The `limit` most recently remembered facts, oldest first.
    pub fn recent_facts(&self, limit: usize) -> &[String] {
        let start = self.facts.len().saturating_sub(limit);
        &self.facts[start..]
    }

    /// Forget everything, including the anti-repetition window.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
