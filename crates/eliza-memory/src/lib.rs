//! `eliza-memory` – per-conversation state.
//!
//! # Modules
//!
//! - [`conversation`] – [`Memory`][conversation::Memory]: the mutable record a
//!   single conversation owns (acquired name, kinship mentions, topic tags,
//!   last mood, remembered facts, and its own anti-repetition window).
//! - [`recent`] – [`RecentReplies`][recent::RecentReplies]: the bounded FIFO
//!   of recently issued replies consulted by the response selector.
//! - [`transcript`] – [`TranscriptLog`][transcript::TranscriptLog]: optional
//!   SQLite-backed transcript of every turn.  Writes are best-effort and never
//!   interrupt a conversation.

pub mod conversation;
pub mod recent;
pub mod transcript;

pub use conversation::Memory;
pub use recent::{RECENT_REPLY_WINDOW, RecentReplies};
pub use transcript::{Speaker, TranscriptEntry, TranscriptError, TranscriptLog};
