//! Fixed commands checked before the general pipeline.
//!
//! [`route`] recognises exit words, meta-commands, and the identity
//! question.  [`handle`] answers them directly; nothing downstream runs once
//! an intent matched.

use chrono::Local;
use eliza_memory::Memory;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::normalize::bare;
use crate::signals::is_exit;

const JOKES: &[&str] = &[
    "Why did the scarecrow win an award? Because he was outstanding in his field.",
    "I told my computer I needed a break. It said: no problem, I will go to sleep.",
    "Why do bees hum? Because they do not know the words.",
    "What do you call a bear with no teeth? A gummy bear.",
];

const IDENTITY_QUESTIONS: &[&str] = &["who are you", "what are you", "what is your name"];

/// A command recognised by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Exit,
    Help,
    Time,
    Joke,
    Reset,
    /// `remember <fact>`; the fact keeps its original casing and may be empty.
    Remember(String),
    Recall,
    Identity,
}

/// Match `text` against the fixed commands, in priority order: exit words,
/// meta-commands, identity question.
pub fn route(text: &str) -> Option<Intent> {
    if is_exit(text) {
        return Some(Intent::Exit);
    }

    let command = bare(text);
    match command.as_str() {
        "help" => return Some(Intent::Help),
        "time" | "what time is it" => return Some(Intent::Time),
        "joke" | "tell me a joke" => return Some(Intent::Joke),
        "reset" => return Some(Intent::Reset),
        "recall" => return Some(Intent::Recall),
        "remember" => return Some(Intent::Remember(String::new())),
        _ => {}
    }

    let trimmed = text.trim();
    if command.starts_with("remember ") {
        // Keep the user's casing: drop the first word of the raw text.
        let fact = trimmed
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or_default()
            .trim_end_matches(['.', '!'])
            .to_string();
        return Some(Intent::Remember(fact));
    }

    if IDENTITY_QUESTIONS.contains(&command.as_str()) {
        return Some(Intent::Identity);
    }

    None
}

/// What the router answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// `true` when the caller should end the conversation.
    pub farewell: bool,
}

impl Reply {
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            farewell: false,
        }
    }

    pub fn farewell(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            farewell: true,
        }
    }
}

/// Answer `intent`, reading or mutating `memory` as the command requires.
pub fn handle<R: Rng + ?Sized>(
    intent: &Intent,
    memory: &mut Memory,
    facts_shown: usize,
    rng: &mut R,
) -> Reply {
    let name = memory.name.clone();
    let comma_name = name.as_deref().map(|n| format!(", {n}")).unwrap_or_default();

    match intent {
        Intent::Exit => match name {
            Some(n) => Reply::farewell(format!("Goodbye, {n}. I wish you well.")),
            None => Reply::farewell("Goodbye. I wish you well."),
        },
        Intent::Help => Reply::say(
            "You can talk to me about anything. I also understand a few words: \
             'help', 'time', 'joke', 'remember <something>', 'recall', 'reset', \
             and 'bye' to finish.",
        ),
        Intent::Time => Reply::say(format!(
            "It is {} right now{comma_name}.",
            Local::now().format("%H:%M")
        )),
        Intent::Joke => {
            let joke = JOKES.choose(rng).copied().unwrap_or(JOKES[0]);
            Reply::say(format!("Here is a small joke{comma_name}. {joke}"))
        }
        Intent::Reset => {
            memory.reset();
            info!("conversation memory reset on request");
            Reply::say(
                "Alright. I have cleared everything I remembered. \
                 Let us start again. What is your name?",
            )
        }
        Intent::Remember(fact) if fact.is_empty() => Reply::say(
            "What should I remember? You can say: \u{201c}remember I have an exam on Friday.\u{201d}",
        ),
        Intent::Remember(fact) => {
            if memory.remember(fact) {
                Reply::say(format!("I will remember that{comma_name}: {fact}."))
            } else {
                Reply::say(format!("I already remember that{comma_name}."))
            }
        }
        Intent::Recall => Reply::say(recall(memory, facts_shown)),
        Intent::Identity => Reply::say(
            "I am Eliza, a simple program that listens and answers with care. \
             I am not a person, but I will read what you write carefully.",
        ),
    }
}

fn recall(memory: &Memory, facts_shown: usize) -> String {
    let mut parts = Vec::new();
    if let Some(name) = &memory.name {
        parts.push(format!("Your name is {name}."));
    }
    if !memory.topic_tags.is_empty() {
        let topics: Vec<String> = memory.topic_tags.iter().map(ToString::to_string).collect();
        parts.push(format!("We talked about {}.", topics.join(", ")));
    }
    let facts = memory.recent_facts(facts_shown);
    if !facts.is_empty() {
        parts.push(format!("You told me: {}.", facts.join("; ")));
    }
    if parts.is_empty() {
        "I do not remember anything yet. You can tell me about yourself.".to_string()
    } else {
        format!("Here is what I remember. {}", parts.join(" "))
    }
}
