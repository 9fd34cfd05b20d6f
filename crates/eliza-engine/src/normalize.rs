//! Text normalization and typo correction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::lexicon::MISSPELLINGS;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("word pattern is valid"));

/// Collapse whitespace runs to single spaces, trim, and lowercase.
///
/// Total and idempotent.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Replace known misspellings, keeping the capitalization of the first
/// letter of each replaced word.
pub fn correct(text: &str) -> String {
    WORD_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let word = &caps[0];
            let lower = word.to_lowercase();
            match MISSPELLINGS.iter().find(|(bad, _)| *bad == lower) {
                Some((_, fixed)) if word.starts_with(|c: char| c.is_uppercase()) => {
                    capitalize(fixed)
                }
                Some((_, fixed)) => fixed.to_string(),
                None => word.to_string(),
            }
        })
        .into_owned()
}

/// Normalized text without trailing sentence punctuation, for matching
/// against fixed phrases ("idk?" → "idk").  Typographic apostrophes become
/// plain ones.
pub fn bare(text: &str) -> String {
    normalize(text)
        .replace('\u{2019}', "'")
        .trim_end_matches(['.', '!', '?', ','])
        .trim_end()
        .to_string()
}

/// Lowercase alphabetic runs.  Apostrophes and hyphens split words, so
/// "mother's" yields "mother" and "s".
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Upper-case the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Hello \t  THERE\n friend "), "hello there friend");
    }

    #[test]
    fn normalize_is_total_and_idempotent() {
        for input in ["", "   ", "A  b", "ÀB  c\u{00A0}d", "idk?!", "My   Name is  SAM."] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {input:?}");
        }
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn correct_fixes_known_words_only() {
        assert_eq!(correct("teh dog is realy wierd"), "the dog is really weird");
        assert_eq!(correct("nothing to fix"), "nothing to fix");
    }

    #[test]
    fn correct_keeps_leading_capital() {
        assert_eq!(correct("Becuase my freind left"), "Because my friend left");
    }

    #[test]
    fn correct_does_not_touch_partial_words() {
        assert_eq!(correct("tehran"), "tehran");
    }

    #[test]
    fn correct_is_idempotent_on_corrected_text() {
        let once = correct("I beleive it happened alot tommorow");
        assert_eq!(correct(&once), once);
    }

    #[test]
    fn bare_strips_trailing_punctuation() {
        assert_eq!(bare("  IDK?! "), "idk");
        assert_eq!(bare("Not sure..."), "not sure");
        assert_eq!(bare("?"), "");
        assert_eq!(bare("I don\u{2019}t know."), "i don't know");
    }

    #[test]
    fn words_splits_on_punctuation() {
        assert_eq!(
            words("My mother's friend, Jean-Paul; is SAD!"),
            vec!["my", "mother", "s", "friend", "jean", "paul", "is", "sad"]
        );
        assert!(words("?!").is_empty());
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("sam"), "Sam");
        assert_eq!(capitalize("o'neil"), "O'neil");
        assert_eq!(capitalize(""), "");
    }
}
