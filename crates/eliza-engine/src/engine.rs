//! The orchestrator.
//!
//! One call per turn: route fixed commands, run the name-acquisition step
//! while the conversation is unnamed, otherwise generate candidates and
//! select one.  Every path returns a reply; nothing here can fail.

use eliza_memory::Memory;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::intent::{self, Reply};
use crate::normalize::words;
use crate::rules;
use crate::selector;
use crate::signals::{extract_name, is_greeting};

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How many top-scored candidates the selector draws from.
    pub shortlist_size: usize,
    /// How many words of the utterance the reflection echoes.
    pub reflect_word_limit: usize,
    /// How many remembered facts `recall` lists.
    pub facts_shown: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shortlist_size: 6,
            reflect_word_limit: 14,
            facts_shown: 5,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Stateless responder.  All conversation state lives in the [`Memory`]
/// passed to each call, so one engine can serve any number of conversations.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer one utterance, drawing randomness from `rng`.
    ///
    /// Order of precedence:
    /// 1. exit words, meta-commands and the identity question;
    /// 2. name acquisition while `memory` has no name;
    /// 3. candidate generation and selection.
    #[instrument(name = "eliza.respond", skip_all, fields(chars = utterance.chars().count()))]
    pub fn respond_with_rng<R: Rng + ?Sized>(
        &self,
        utterance: &str,
        memory: &mut Memory,
        rng: &mut R,
    ) -> Reply {
        if let Some(intent) = intent::route(utterance) {
            debug!(?intent, "intent matched");
            let reply = intent::handle(&intent, memory, self.config.facts_shown, rng);
            memory.recent.record(&reply.text);
            return reply;
        }

        if !memory.is_named() {
            let text = acquire_name(utterance, memory);
            memory.recent.record(&text);
            return Reply::say(text);
        }

        let candidates = rules::generate(utterance, memory, self.config.reflect_word_limit);
        let text = selector::select(
            &candidates,
            &mut memory.recent,
            self.config.shortlist_size,
            rng,
        );
        Reply::say(text)
    }

    /// Answer one utterance using the thread-local RNG.
    pub fn respond(&self, utterance: &str, memory: &mut Memory) -> Reply {
        self.respond_with_rng(utterance, memory, &mut rand::thread_rng())
    }

    /// Answer one utterance and return only the text.
    pub fn process(&self, utterance: &str, memory: &mut Memory) -> String {
        self.respond(utterance, memory).text
    }
}

/// Answer one utterance with the default engine.
///
/// Total: empty and whitespace-only input are valid and get a reply.
pub fn process(utterance: &str, memory: &mut Memory) -> String {
    Engine::default().process(utterance, memory)
}

// ─────────────────────────────────────────────────────────────────────────────
// Name acquisition
// ─────────────────────────────────────────────────────────────────────────────

/// The unnamed step.  Either binds a name and greets it, or asks for one.
fn acquire_name(utterance: &str, memory: &mut Memory) -> String {
    if utterance.trim().is_empty() {
        return "Please take your time. When you are ready, tell me your name.".to_string();
    }

    if let Some(name) = extract_name(utterance)
        && memory.acquire_name(&name)
    {
        info!(name = %name, "user name acquired");
        return format!(
            "Nice to meet you, {name}. How are you feeling today? \
             You can share a little or a lot. I will read carefully."
        );
    }

    if is_greeting(utterance) {
        "Hello. I want to use your name so my sentences are clear and polite. \
         Please tell me your name. You can say: \u{201c}My name is Sam.\u{201d}"
            .to_string()
    } else if words(utterance).iter().any(|w| w == "name") {
        "I understand. Please tell me your exact name so I can address you well. \
         For example: \u{201c}My name is Sam.\u{201d} What is your name?"
            .to_string()
    } else {
        "Thank you. I would like to address you by your name to make my words clear. \
         Please tell me your name. You can say: \u{201c}My name is Sam.\u{201d}"
            .to_string()
    }
}
