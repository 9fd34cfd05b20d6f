//! Signal extractors.
//!
//! Each extractor is a pure function over the raw (or typo-corrected)
//! utterance.  None of them fail: an absent signal is `None`, `false`, or an
//! empty collection.  [`Signals::extract`] runs them all once per turn.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use eliza_types::{Feeling, TopicTag};
use regex::Regex;

use crate::lexicon::{self, contains};
use crate::normalize::{bare, capitalize, normalize, words};

/// Self-introduction followed by a 2–31 character name candidate.
static INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:my\s+name\s+is|i\s+am|i['’]?m|call\s+me)\s+([a-z][a-z'\-]{1,30})|\bname\s*:\s*([a-z][a-z'\-]{1,30})",
    )
    .expect("introduction pattern is valid")
});

/// Name-shaped token of at least two letters; single letters never count.
static NAME_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]{1,30}").expect("token pattern is valid"));

/// First-person disclosure worth remembering as a fact.
static DISCLOSURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:i\s+am|i['’]m|i\s+feel|i\s+have|i\s+want|my)\b")
        .expect("disclosure pattern is valid")
});

const CLARIFIER_WORDS: &[&str] = &["what", "huh", "why", "pardon"];

const MIN_DISCLOSURE_WORDS: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Name
// ─────────────────────────────────────────────────────────────────────────────

/// Extract a likely first name.
///
/// An explicit introduction ("my name is", "I am", "I'm", "call me",
/// "name:") decides on its own: if the word after it is not a plausible name
/// the result is `None` and no fallback is tried.  Without an introduction a
/// message made of exactly one word is taken as the name, unless that word is
/// a greeting or another common non-name.
pub fn extract_name(text: &str) -> Option<String> {
    let text = text.trim();

    if let Some(caps) = INTRO_RE.captures(text) {
        let candidate = caps.get(1).or_else(|| caps.get(2))?.as_str();
        return validate_name(candidate);
    }

    let mut tokens = NAME_TOKEN_RE.find_iter(text);
    match (tokens.next(), tokens.next()) {
        (Some(only), None) => validate_name(only.as_str()),
        _ => None,
    }
}

fn validate_name(candidate: &str) -> Option<String> {
    let token = candidate.trim_end_matches(['\'', '-']);
    if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    if lexicon::is_not_a_name(&token.to_lowercase()) {
        return None;
    }
    Some(capitalize(token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Feeling, relation, verbs
// ─────────────────────────────────────────────────────────────────────────────

/// Feeling polarity.  A negative word anywhere wins over any positive word.
pub fn extract_feeling(text: &str) -> Option<Feeling> {
    let tokens = words(text);
    if tokens.iter().any(|w| contains(lexicon::NEGATIVE_WORDS, w)) {
        return Some(Feeling::Negative);
    }
    if tokens.iter().any(|w| contains(lexicon::POSITIVE_WORDS, w)) {
        return Some(Feeling::Positive);
    }
    None
}

/// First kinship term present, in [`lexicon::KINSHIP_TERMS`] order.
pub fn extract_relationship(text: &str) -> Option<&'static str> {
    let tokens = words(text);
    lexicon::KINSHIP_TERMS
        .iter()
        .copied()
        .find(|term| tokens.iter().any(|w| w == term))
}

/// Words of three or more letters ending in "ed", in order of appearance.
///
/// A spelling heuristic, not morphology: "red" counts.
pub fn extract_past_tense_verbs(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| w.chars().count() >= 3 && w.ends_with("ed"))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Phrase tests
// ─────────────────────────────────────────────────────────────────────────────

/// `true` if the text is, or opens with, a greeting.
pub fn is_greeting(text: &str) -> bool {
    let t = normalize(text);
    lexicon::GREETINGS.iter().any(|g| match t.strip_prefix(g) {
        Some(rest) => !rest.starts_with(|c: char| c.is_alphabetic()),
        None => false,
    })
}

/// Topic tags suggested by individual words.  Kinship terms count as
/// relationships.
pub fn detect_topic_hints(text: &str) -> BTreeSet<TopicTag> {
    let tokens = words(text);
    let mut tags: BTreeSet<TopicTag> = lexicon::TOPIC_VOCABULARIES
        .iter()
        .filter(|(_, vocab)| tokens.iter().any(|w| contains(vocab, w)))
        .map(|(tag, _)| *tag)
        .collect();
    if tokens.iter().any(|w| contains(lexicon::KINSHIP_TERMS, w)) {
        tags.insert(TopicTag::Relationships);
    }
    tags
}

/// `true` if the words "in town" appear next to each other.
pub fn mentions_in_town(text: &str) -> bool {
    words(text).windows(2).any(|pair| pair[0] == "in" && pair[1] == "town")
}

/// First time-reference word, if any.
pub fn time_reference(text: &str) -> Option<&'static str> {
    let tokens = words(text);
    lexicon::TIME_WORDS
        .iter()
        .copied()
        .find(|t| tokens.iter().any(|w| w == t))
}

/// `true` if the text talks about the listener ("you", "your").
pub fn is_self_focused(text: &str) -> bool {
    words(text).iter().any(|w| contains(lexicon::SELF_FOCUS_WORDS, w))
}

pub fn is_confused_utterance(text: &str) -> bool {
    contains(lexicon::CONFUSED_UTTERANCES, &bare(text))
}

pub fn is_negative_acknowledgement(text: &str) -> bool {
    contains(lexicon::NEGATIVE_ACKS, &bare(text))
}

pub fn is_affirmation(text: &str) -> bool {
    contains(lexicon::AFFIRMATIONS, &bare(text))
}

pub fn is_exit(text: &str) -> bool {
    contains(lexicon::EXIT_WORDS, &bare(text))
}

/// A lone "what", "huh", or bare question mark.
pub fn is_single_word_question(text: &str) -> bool {
    let t = normalize(text);
    if !t.is_empty() && t.chars().all(|c| c == '?') {
        return true;
    }
    contains(CLARIFIER_WORDS, &bare(text))
}

/// `true` for first-person statements ("I am…", "my…") of three or more
/// words.
pub fn is_disclosure(text: &str) -> bool {
    let t = normalize(text);
    t.split(' ').count() >= MIN_DISCLOSURE_WORDS && DISCLOSURE_RE.is_match(&t)
}

// ─────────────────────────────────────────────────────────────────────────────
// Signals
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the extractors found in one utterance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub feeling: Option<Feeling>,
    pub relation: Option<&'static str>,
    pub past_verbs: Vec<String>,
    pub greeting: bool,
    pub topics: BTreeSet<TopicTag>,
    pub in_town: bool,
    pub time_word: Option<&'static str>,
    pub self_focus: bool,
    pub confused: bool,
    pub negative_ack: bool,
    pub affirmation: bool,
    pub clarifier: bool,
    pub disclosure: bool,
}

impl Signals {
    /// Run every extractor over `text`.
    pub fn extract(text: &str) -> Self {
        Self {
            feeling: extract_feeling(text),
            relation: extract_relationship(text),
            past_verbs: extract_past_tense_verbs(text),
            greeting: is_greeting(text),
            topics: detect_topic_hints(text),
            in_town: mentions_in_town(text),
            time_word: time_reference(text),
            self_focus: is_self_focused(text),
            confused: is_confused_utterance(text),
            negative_ack: is_negative_acknowledgement(text),
            affirmation: is_affirmation(text),
            clarifier: is_single_word_question(text),
            disclosure: is_disclosure(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Names ─────────────────────────────────────────────────────────────────

    #[test]
    fn name_from_introduction_any_casing() {
        for text in ["My name is Sam.", "my name is sam", "MY NAME IS SAM", "Well, my name is sAm!"] {
            let name = extract_name(text);
            assert!(
                name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("sam") && n.starts_with('S')),
                "{text:?} gave {name:?}"
            );
        }
        assert_eq!(extract_name("my name is sam").as_deref(), Some("Sam"));
    }

    #[test]
    fn name_from_other_introductions() {
        assert_eq!(extract_name("I am Alice").as_deref(), Some("Alice"));
        assert_eq!(extract_name("I'm bob").as_deref(), Some("Bob"));
        assert_eq!(extract_name("im carol").as_deref(), Some("Carol"));
        assert_eq!(extract_name("call me Jean-Paul").as_deref(), Some("Jean-Paul"));
        assert_eq!(extract_name("name: o'neil").as_deref(), Some("O'neil"));
    }

    #[test]
    fn introduction_with_non_name_gives_nothing() {
        assert_eq!(extract_name("I am sad"), None);
        assert_eq!(extract_name("I'm feeling great today"), None);
        assert_eq!(extract_name("i am not sure"), None);
    }

    #[test]
    fn single_greeting_is_not_a_name() {
        for g in ["hi", "Hi", "hello!", "Hey", "yo"] {
            assert_eq!(extract_name(g), None, "{g:?} must not be a name");
        }
    }

    #[test]
    fn single_word_falls_back_to_name() {
        assert_eq!(extract_name("zoe"), Some("Zoe".to_string()));
        assert_eq!(extract_name("  Marcus. "), Some("Marcus".to_string()));
    }

    #[test]
    fn single_letters_are_not_names() {
        assert_eq!(extract_name("I"), None);
        assert_eq!(extract_name("k"), None);
        assert_eq!(extract_name("call me J"), None);
        assert_eq!(extract_name("Jo"), Some("Jo".to_string()));
    }

    #[test]
    fn several_words_without_introduction_give_nothing() {
        assert_eq!(extract_name("the weather is nice"), None);
        assert_eq!(extract_name(""), None);
        assert_eq!(extract_name("   "), None);
    }

    #[test]
    fn important_is_not_an_introduction() {
        assert_eq!(extract_name("important stuff"), None);
    }

    // ── Feelings / relations / verbs ──────────────────────────────────────────

    #[test]
    fn negative_feeling_wins_ties() {
        assert_eq!(extract_feeling("I am happy but also sad"), Some(Feeling::Negative));
        assert_eq!(extract_feeling("good day, bad night"), Some(Feeling::Negative));
        assert_eq!(extract_feeling("I feel great"), Some(Feeling::Positive));
        assert_eq!(extract_feeling("the sky is blue"), None);
    }

    #[test]
    fn feeling_matches_whole_words_only() {
        assert_eq!(extract_feeling("badminton saddle"), None);
    }

    #[test]
    fn relationship_uses_list_order() {
        assert_eq!(extract_relationship("my brother and my mother"), Some("mother"));
        assert_eq!(extract_relationship("My DAD called"), Some("dad"));
        assert_eq!(extract_relationship("my mother's car"), Some("mother"));
        assert_eq!(extract_relationship("smothered"), None);
    }

    #[test]
    fn past_tense_heuristic() {
        assert_eq!(
            extract_past_tense_verbs("I started and ended, then moved. ed"),
            vec!["started", "ended", "moved"]
        );
        assert_eq!(extract_past_tense_verbs("the red car"), vec!["red"]);
        assert!(extract_past_tense_verbs("nothing here").is_empty());
    }

    // ── Phrase tests ──────────────────────────────────────────────────────────

    #[test]
    fn greeting_detection_respects_word_boundary() {
        assert!(is_greeting("Hello there"));
        assert!(is_greeting("hi!"));
        assert!(is_greeting("  Good   morning, Eliza"));
        assert!(!is_greeting("history is boring"));
        assert!(!is_greeting("you are nice"));
    }

    #[test]
    fn topic_hints_can_be_several() {
        let tags = detect_topic_hints("My boss says I need a doctor");
        assert!(tags.contains(&TopicTag::Work));
        assert!(tags.contains(&TopicTag::Health));
        assert_eq!(tags.len(), 2);
        assert!(detect_topic_hints("my sister").contains(&TopicTag::Relationships));
        assert!(detect_topic_hints("nice weather").is_empty());
    }

    #[test]
    fn in_town_cue() {
        assert!(mentions_in_town("She is in town this week"));
        assert!(!mentions_in_town("the town is quiet"));
    }

    #[test]
    fn fixed_set_tests_ignore_case_and_punctuation() {
        assert!(is_confused_utterance("IDK"));
        assert!(is_confused_utterance("I don't know."));
        assert!(!is_confused_utterance("I don't know what to do"));
        assert!(is_confused_utterance("I don\u{2019}t know"));
        assert!(is_negative_acknowledgement("Nope!"));
        assert!(is_affirmation("yes."));
        assert!(is_exit("Bye!"));
        assert!(!is_exit("bye for now"));
    }

    #[test]
    fn clarifier_questions() {
        assert!(is_single_word_question("what"));
        assert!(is_single_word_question("What?"));
        assert!(is_single_word_question("??"));
        assert!(!is_single_word_question("what do you mean"));
        assert!(!is_single_word_question(""));
    }

    #[test]
    fn disclosure_needs_three_words() {
        assert!(is_disclosure("I have a dog"));
        assert!(is_disclosure("My job is hard"));
        assert!(is_disclosure("I'm moving next month"));
        assert!(!is_disclosure("I am"));
        assert!(!is_disclosure("mystery novels are fun"));
        assert!(!is_disclosure("you have a dog"));
    }

    #[test]
    fn signals_extract_runs_all_detectors() {
        let s = Signals::extract("I am feeling very sad because my brother moved");
        assert_eq!(s.feeling, Some(Feeling::Negative));
        assert_eq!(s.relation, Some("brother"));
        assert_eq!(s.past_verbs, vec!["moved"]);
        assert!(s.disclosure);
        assert!(!s.greeting);
        assert!(s.topics.contains(&TopicTag::Relationships));
    }
}
