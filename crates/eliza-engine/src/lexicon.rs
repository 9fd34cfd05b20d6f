//! Word lists and small vocabularies the extractors match against.
//!
//! Everything here is lowercase.  Multi-word entries are matched against
//! normalized text, single words against word tokens.

use eliza_types::TopicTag;

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "sad", "upset", "depressed", "angry", "lonely", "tired", "hurt", "anxious", "worried",
    "stressed", "scared", "unhappy", "miserable",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "fine", "happy", "better", "okay", "glad", "excited", "calm", "relieved",
];

pub const CONFUSED_UTTERANCES: &[&str] = &[
    "i don't know",
    "i dont know",
    "idk",
    "not sure",
    "no idea",
    "dunno",
];

pub const NEGATIVE_ACKS: &[&str] = &["no", "nope", "nothing", "nah"];

pub const AFFIRMATIONS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "sure", "ok", "right", "of course", "i guess",
];

pub const GREETINGS: &[&str] = &[
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
    "hello",
    "howdy",
    "hola",
    "hey",
    "hi",
    "yo",
];

pub const EXIT_WORDS: &[&str] = &["bye", "exit", "quit", "goodbye"];

/// Order matters: the first term found wins.
pub const KINSHIP_TERMS: &[&str] = &[
    "mother",
    "mom",
    "father",
    "dad",
    "brother",
    "sister",
    "wife",
    "husband",
    "son",
    "daughter",
    "friend",
    "partner",
    "boyfriend",
    "girlfriend",
    "grandmother",
    "grandfather",
    "grandma",
    "grandpa",
    "aunt",
    "uncle",
    "cousin",
];

pub const TIME_WORDS: &[&str] = &[
    "today",
    "yesterday",
    "tomorrow",
    "tonight",
    "lately",
    "recently",
    "morning",
    "weekend",
    "anymore",
];

pub const SELF_FOCUS_WORDS: &[&str] = &["you", "your", "yours", "yourself"];

/// Words that follow "I am" far more often than a name does.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "not", "so", "very", "really", "just", "feeling", "doing", "going", "here",
    "still", "also", "sorry", "afraid", "sure", "well", "fine", "trying", "working", "thinking",
    "from", "in", "at", "and", "but", "or", "what", "why", "how", "who", "when", "where", "thanks",
    "thank", "please", "ok", "okay", "bye", "exit", "quit", "goodbye", "help", "time", "joke",
    "reset", "remember", "recall", "name", "is", "me", "you", "it", "that", "this",
];

const WORK_WORDS: &[&str] = &[
    "work", "job", "boss", "office", "career", "coworker", "colleague", "salary", "meeting",
    "project", "shift",
];

const HEALTH_WORDS: &[&str] = &[
    "health", "sick", "ill", "doctor", "hospital", "pain", "sleep", "headache", "medicine",
    "therapy", "insomnia",
];

const STUDY_WORDS: &[&str] = &[
    "study", "school", "exam", "exams", "class", "homework", "university", "college", "teacher",
    "grade", "grades", "lecture",
];

const RELATIONSHIP_WORDS: &[&str] = &[
    "relationship", "love", "dating", "marriage", "divorce", "breakup", "family", "friends",
    "married",
];

/// Per-topic vocabularies.
pub const TOPIC_VOCABULARIES: &[(TopicTag, &[&str])] = &[
    (TopicTag::Work, WORK_WORDS),
    (TopicTag::Health, HEALTH_WORDS),
    (TopicTag::Study, STUDY_WORDS),
    (TopicTag::Relationships, RELATIONSHIP_WORDS),
];

/// Known misspellings and their corrections.
pub const MISSPELLINGS: &[(&str, &str)] = &[
    ("teh", "the"),
    ("becuase", "because"),
    ("becasue", "because"),
    ("freind", "friend"),
    ("realy", "really"),
    ("wierd", "weird"),
    ("definately", "definitely"),
    ("alot", "a lot"),
    ("untill", "until"),
    ("beleive", "believe"),
    ("tommorow", "tomorrow"),
];

/// Pronoun reflections, tried in order at every word position.  Multi-word
/// patterns come first so "i am" wins over "i".
pub const REFLECTIONS: &[(&str, &str)] = &[
    ("i am", "you are"),
    ("i was", "you were"),
    ("you are", "I am"),
    ("you were", "I was"),
    ("i'm", "you're"),
    ("you're", "I'm"),
    ("i've", "you've"),
    ("you've", "I've"),
    ("i'll", "you'll"),
    ("you'll", "I'll"),
    ("i'd", "you'd"),
    ("am", "are"),
    ("myself", "yourself"),
    ("yourself", "myself"),
    ("mine", "yours"),
    ("yours", "mine"),
    ("my", "your"),
    ("your", "my"),
    ("me", "you"),
    ("i", "you"),
    ("you", "me"),
];

/// `true` if `word` is in `list`.
pub fn contains(list: &[&str], word: &str) -> bool {
    list.iter().any(|w| *w == word)
}

/// `true` if `word` must never be taken for a name.
pub fn is_not_a_name(word: &str) -> bool {
    [
        GREETINGS,
        NEGATIVE_ACKS,
        AFFIRMATIONS,
        CONFUSED_UTTERANCES,
        NEGATIVE_WORDS,
        POSITIVE_WORDS,
        STOP_WORDS,
        EXIT_WORDS,
    ]
    .iter()
    .any(|list| contains(list, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_lowercase() {
        let all: Vec<&str> = [
            NEGATIVE_WORDS,
            POSITIVE_WORDS,
            CONFUSED_UTTERANCES,
            NEGATIVE_ACKS,
            AFFIRMATIONS,
            GREETINGS,
            KINSHIP_TERMS,
            TIME_WORDS,
            STOP_WORDS,
        ]
        .concat();
        for w in all {
            assert_eq!(w, w.to_lowercase(), "'{w}' must be lowercase");
        }
    }

    #[test]
    fn feeling_sets_are_disjoint() {
        for w in NEGATIVE_WORDS {
            assert!(!contains(POSITIVE_WORDS, w), "'{w}' is in both feeling sets");
        }
    }

    #[test]
    fn corrections_are_not_themselves_misspellings() {
        for (_, fixed) in MISSPELLINGS {
            for word in fixed.split(' ') {
                assert!(
                    !MISSPELLINGS.iter().any(|(bad, _)| *bad == word),
                    "correction '{fixed}' would be corrected again"
                );
            }
        }
    }

    #[test]
    fn greetings_and_feelings_are_not_names() {
        assert!(is_not_a_name("hello"));
        assert!(is_not_a_name("sad"));
        assert!(is_not_a_name("idk"));
        assert!(is_not_a_name("feeling"));
        assert!(!is_not_a_name("sam"));
    }
}
