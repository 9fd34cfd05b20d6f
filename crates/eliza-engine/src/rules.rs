//! Candidate generation – the rule table.
//!
//! Every [`ResponseRule`] pairs a predicate over the turn's signals with a
//! template generator.  Rules are not exclusive: each one whose predicate
//! holds appends its candidates, so one utterance can yield a relationship
//! question, a past-tense probe, and a reflection at the same time.  The
//! selector decides among them using each rule's priority.
//!
//! | Rule            | Priority | Fires when                                   |
//! |-----------------|----------|----------------------------------------------|
//! | `clarifier`     | 90       | a lone "what", "huh", or "?"                 |
//! | `confusion`     | 90       | "idk", "not sure", …                         |
//! | `negative_ack`  | 80       | "no", "nope", "nothing"                      |
//! | `in_town`       | 75       | "in town" appears                            |
//! | `relationship`  | 70       | a kinship term appears                       |
//! | `feeling`       | 60       | a feeling word without a kinship term        |
//! | `greeting`      | 50       | the text opens with a greeting               |
//! | `affirmation`   | 45       | "yes", "ok", "sure"                          |
//! | `past_tense`    | 40       | words ending in "ed"                         |
//! | `self_focus`    | 35       | "you", "your"                                |
//! | `temporal`      | 30       | "today", "lately", …                         |
//! | `reflection`    | 10       | any words at all                             |
//! | `filler`        | 0        | always                                       |

use eliza_memory::Memory;
use eliza_types::{DEFAULT_USER_NAME, Feeling};
use tracing::debug;

use crate::lexicon::REFLECTIONS;
use crate::normalize::{correct, normalize};
use crate::signals::Signals;

const MAX_PROBED_VERBS: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Turn / Candidate
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a rule may look at.  Memory has already been updated with this
/// turn's relation, topics and mood.
#[derive(Debug, Clone)]
pub struct Turn<'a> {
    /// The typo-corrected utterance.
    pub text: &'a str,
    pub name: &'a str,
    pub signals: &'a Signals,
    /// Mention count of `signals.relation`, this turn included.
    pub relation_mentions: u32,
    pub last_relation: Option<&'a str>,
    /// How many words the reflection may echo.
    pub reflect_words: usize,
}

/// One proposed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub priority: u8,
    /// Name of the rule that proposed it.
    pub rule: &'static str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule table
// ─────────────────────────────────────────────────────────────────────────────

/// A predicate and the templates it unlocks.
pub struct ResponseRule {
    pub name: &'static str,
    pub priority: u8,
    pub applies: fn(&Turn<'_>) -> bool,
    pub propose: fn(&Turn<'_>) -> Vec<String>,
}

/// The rule table, evaluated top to bottom once per turn.  `filler` is last
/// and always applies, so the candidate list is never empty.
pub const RULES: &[ResponseRule] = &[
    ResponseRule {
        name: "clarifier",
        priority: 90,
        applies: |t| t.signals.clarifier,
        propose: clarifier,
    },
    ResponseRule {
        name: "confusion",
        priority: 90,
        applies: |t| t.signals.confused,
        propose: confusion,
    },
    ResponseRule {
        name: "greeting",
        priority: 50,
        applies: |t| t.signals.greeting,
        propose: greeting,
    },
    ResponseRule {
        name: "negative_ack",
        priority: 80,
        applies: |t| t.signals.negative_ack,
        propose: negative_ack,
    },
    ResponseRule {
        name: "affirmation",
        priority: 45,
        applies: |t| t.signals.affirmation,
        propose: affirmation,
    },
    ResponseRule {
        name: "temporal",
        priority: 30,
        applies: |t| t.signals.time_word.is_some(),
        propose: temporal,
    },
    ResponseRule {
        name: "self_focus",
        priority: 35,
        applies: |t| t.signals.self_focus,
        propose: self_focus,
    },
    ResponseRule {
        name: "relationship",
        priority: 70,
        applies: |t| t.signals.relation.is_some(),
        propose: relationship,
    },
    ResponseRule {
        name: "feeling",
        priority: 60,
        applies: |t| t.signals.relation.is_none() && t.signals.feeling.is_some(),
        propose: feeling,
    },
    ResponseRule {
        name: "past_tense",
        priority: 40,
        applies: |t| !t.signals.past_verbs.is_empty(),
        propose: past_tense,
    },
    ResponseRule {
        name: "in_town",
        priority: 75,
        applies: |t| t.signals.in_town,
        propose: in_town,
    },
    ResponseRule {
        name: "reflection",
        priority: 10,
        applies: |t| !reflect(t.text, t.reflect_words).is_empty(),
        propose: reflection,
    },
    ResponseRule {
        name: "filler",
        priority: 0,
        applies: |_| true,
        propose: filler,
    },
];

/// Fold this turn's signals into `memory` and collect every candidate the
/// rule table proposes for `text`.
///
/// Side effects: mood, topic tags and kinship mentions are updated, and
/// first-person disclosures of three or more words are remembered as facts.
/// The returned list is never empty and holds no duplicate texts.
pub fn generate(text: &str, memory: &mut Memory, reflect_words: usize) -> Vec<Candidate> {
    let corrected = correct(text);
    let signals = Signals::extract(&corrected);

    if let Some(feeling) = signals.feeling {
        memory.set_mood(feeling);
    }
    memory.add_topics(signals.topics.iter().copied());
    let relation_mentions = signals
        .relation
        .map(|rel| memory.note_relation(rel))
        .unwrap_or(0);
    if signals.disclosure && memory.remember(text) {
        debug!(fact = text.trim(), "remembered disclosure");
    }

    let turn = Turn {
        text: &corrected,
        name: memory.name.as_deref().unwrap_or(DEFAULT_USER_NAME),
        signals: &signals,
        relation_mentions,
        last_relation: memory.last_relation.as_deref(),
        reflect_words,
    };

    let mut candidates: Vec<Candidate> = Vec::new();
    for rule in RULES {
        if !(rule.applies)(&turn) {
            continue;
        }
        let proposed = (rule.propose)(&turn);
        debug!(rule = rule.name, proposed = proposed.len(), "rule fired");
        for text in proposed {
            if candidates.iter().all(|c| c.text != text) {
                candidates.push(Candidate {
                    text,
                    priority: rule.priority,
                    rule: rule.name,
                });
            }
        }
    }
    candidates
}

// ─────────────────────────────────────────────────────────────────────────────
// Reflection
// ─────────────────────────────────────────────────────────────────────────────

/// Echo the first `limit` words of `text` with pronouns swapped
/// ("I am" → "you are", "my" → "your", …).
///
/// Patterns are tried in [`REFLECTIONS`] order at every position; the first
/// match is consumed, so nothing is swapped twice.
pub fn reflect(text: &str, limit: usize) -> String {
    let tokens: Vec<String> = normalize(text)
        .split(' ')
        .take(limit)
        .map(|t| {
            t.trim_matches(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
                .replace('’', "'")
        })
        .filter(|t| !t.is_empty())
        .collect();

    let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let matched = REFLECTIONS.iter().find_map(|(pattern, replacement)| {
            let parts: Vec<&str> = pattern.split(' ').collect();
            let window = tokens.get(i..i + parts.len())?;
            window
                .iter()
                .zip(&parts)
                .all(|(tok, part)| tok.as_str() == *part)
                .then_some((parts.len(), *replacement))
        });
        match matched {
            Some((len, replacement)) => {
                out.push(replacement);
                i += len;
            }
            None => {
                out.push(tokens[i].as_str());
                i += 1;
            }
        }
    }
    out.join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────────

fn clarifier(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!(
            "Do you wish to ask something in particular, {name}? \
             I will try to answer in simple and clear words. Please continue when you are ready."
        ),
        format!("I am not sure what you are asking, {name}. Could you say a little more?"),
    ]
}

fn confusion(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!(
            "It is okay not to know, {name}. Some ideas are hard to explain. \
             You can take your time and speak in small steps. I am listening."
        ),
        format!(
            "That is alright, {name}. Not knowing is a normal feeling. \
             What is the first thing that comes to mind?"
        ),
        format!("No need to be sure, {name}. We can find the words together. Where would you like to start?"),
    ]
}

fn greeting(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!("Hello again, {name}. How are you feeling right now?"),
        format!("Hi, {name}. It is nice to hear from you. What would you like to talk about?"),
    ]
}

fn negative_ack(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!(
            "Alright, {name}. You do not need to push yourself. \
             If you want to continue later, I will be here. I respect your pace."
        ),
        format!("That is fine, {name}. We can sit with it for a moment. Is there something else on your mind?"),
    ]
}

fn affirmation(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!("I see, {name}. Please tell me more."),
        format!("Alright, {name}. What would you like to say next?"),
        format!("Thank you, {name}. Go on when you are ready."),
    ]
}

fn temporal(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    let Some(word) = t.signals.time_word else {
        return Vec::new();
    };
    vec![
        format!("You mentioned \u{201c}{word}\u{201d}, {name}. Has this been on your mind for a while?"),
        format!("Does \u{201c}{word}\u{201d} feel different from other times, {name}?"),
    ]
}

fn self_focus(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!("We are here to talk about you, {name}, not me. What is on your mind?"),
        format!("I am only a simple program, {name}. I would rather hear about you. How are you feeling?"),
    ]
}

fn relationship(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    let Some(rel) = t.signals.relation else {
        return Vec::new();
    };

    if t.relation_mentions >= 3 {
        return vec![
            format!(
                "You have mentioned your {rel} several times, {name}. \
                 They seem to be on your mind a lot. What is the hardest part right now?"
            ),
            format!(
                "You have mentioned your {rel} several times now, {name}. \
                 What would you like to change between the two of you?"
            ),
        ];
    }

    if t.relation_mentions == 2 {
        let clause = match t.signals.feeling {
            Some(Feeling::Negative) => "It sounds like it still weighs on you. ",
            Some(Feeling::Positive) => "It sounds like they bring you some joy. ",
            None => "",
        };
        return vec![
            format!("You mentioned your {rel} again, {name}. {clause}What else would you like to say about them?"),
            format!("Your {rel} came up again, {name}. {clause}Has this been on your mind for a while?"),
        ];
    }

    match t.signals.feeling {
        Some(Feeling::Negative) => vec![
            format!(
                "I am sorry you are going through this with your {rel}, {name}. \
                 It is alright to have hard moments. What happened?"
            ),
            format!(
                "That sounds painful, {name}. Your {rel} matters to you. \
                 Would you like to tell me more about how you feel?"
            ),
        ],
        Some(Feeling::Positive) => vec![
            format!("It is good to hear something warm about your {rel}, {name}. What do you enjoy most about them?"),
            format!("I am glad things feel good with your {rel}, {name}. What happened?"),
        ],
        None => vec![
            format!(
                "Your {rel} seems important to you, {name}. I understand that family can affect us strongly. \
                 Would you like to share what is happening with your {rel}? I will listen with care."
            ),
            format!("How are things with your {rel} these days, {name}?"),
        ],
    }
}

fn feeling(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    match t.signals.feeling {
        Some(Feeling::Negative) => vec![
            format!(
                "I see you are not feeling well, {name}. It is alright to have hard moments. \
                 If you wish, you can say what led to this feeling. I am here to listen."
            ),
            format!("I hear that this is hard for you, {name}. What do you think is behind this feeling?"),
        ],
        Some(Feeling::Positive) => vec![
            format!(
                "I am glad to hear that, {name}. It is good to notice positive moments. \
                 What do you think helped you feel this way? You may share more if you want."
            ),
            format!("That is lovely to hear, {name}. What made you feel this way?"),
        ],
        None => Vec::new(),
    }
}

fn past_tense(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    let verbs = &t.signals.past_verbs;
    let mut out = Vec::new();
    if verbs.iter().any(|v| v == "started") {
        out.push(format!("When did it start, {name}? What has changed since then?"));
    }
    if verbs.iter().any(|v| v == "ended") {
        out.push(format!(
            "It sounds like something came to an end, {name}. How do you feel about that ending?"
        ));
    }
    if out.is_empty() {
        let mut distinct: Vec<&str> = verbs.iter().map(String::as_str).collect();
        distinct.sort_unstable();
        distinct.dedup();
        distinct.truncate(MAX_PROBED_VERBS);
        out.push(format!(
            "You said \u{201c}{}\u{201d}. Can you tell me more about what happened, {name}?",
            join_words(&distinct)
        ));
    }
    out
}

fn in_town(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    match t.last_relation {
        Some(rel) => vec![
            format!("Is your {rel} in town, {name}? How do you feel about the visit?"),
            format!("Your {rel} is in town. Is that good news for you, {name}?"),
        ],
        None => vec![format!("Who is in town, {name}? Is it someone close to you?")],
    }
}

fn reflection(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    let echo = reflect(t.text, t.reflect_words);
    vec![
        format!("Why do you say that {echo}?"),
        format!("How does it feel to say that {echo}, {name}?"),
    ]
}

fn filler(t: &Turn<'_>) -> Vec<String> {
    let name = t.name;
    vec![
        format!("I understand, {name}. You may share more if you wish. Short or long is fine. I will read with care."),
        format!(
            "Thank you for telling me this, {name}. It is not always easy to talk. \
             If there is more you want to add, please do. I am here to listen."
        ),
        format!("I hear you, {name}. We can go step by step. Say whatever feels safe to say. I am patient."),
        format!("Please go on, {name}. I am listening closely."),
    ]
}

/// "a", "a and b", "a, b and c".
fn join_words(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
