//! # eliza-engine
//!
//! The rule-based responder.  Text flows through these stages every turn:
//!
//! ```text
//! utterance ──► intent::route ──► (command reply)
//!                  │
//!                  ▼
//!          name acquisition ──► (greeting / name prompt)   while unnamed
//!                  │
//!                  ▼
//!   normalize::correct ─► signals ─► rules::generate ─► selector::select
//! ```
//!
//! - [`lexicon`] – word lists shared by the extractors.
//! - [`normalize`] – whitespace/case normalisation and typo correction.
//! - [`signals`] – pure extractors (name, feeling, relation, verbs, …).
//! - [`intent`] – exit words, meta-commands and the identity question.
//! - [`rules`] – the ordered rule table that proposes candidates.
//! - [`selector`] – scoring and anti-repetition selection.
//! - [`engine`] – the [`Engine`] orchestrator and [`process`].
//! - [`telemetry`] – `tracing` subscriber and OTLP setup for binaries.

pub mod engine;
pub mod intent;
pub mod lexicon;
pub mod normalize;
pub mod rules;
pub mod selector;
pub mod signals;
pub mod telemetry;

pub use engine::{Engine, EngineConfig, process};
pub use intent::{Intent, Reply};
pub use normalize::{correct, normalize};
pub use rules::{Candidate, generate};
pub use selector::select;
pub use signals::{Signals, extract_name};
pub use telemetry::{TracerProviderGuard, init_tracing};
