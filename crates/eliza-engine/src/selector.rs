//! Reply selection.
//!
//! Candidates are scored, the best few are shortlisted, and one is drawn at
//! random from the highest-priority band of the shortlist that was not said
//! recently.  The pick is recorded in the conversation's [`RecentReplies`].

use eliza_memory::RecentReplies;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::rules::Candidate;

/// Said when there is nothing at all to choose from.
pub const FALLBACK_REPLY: &str = "Please go on. I am listening.";

/// Subtracted from the score of a reply found in the recent window.
const RECENT_PENALTY: i32 = 50;
/// Added to replies that ask a question.
const QUESTION_BONUS: i32 = 2;
/// One point per this many characters, up to [`MAX_LENGTH_BONUS`].
const CHARS_PER_LENGTH_POINT: usize = 40;
const MAX_LENGTH_BONUS: i32 = 3;

/// Score one candidate against the recent window.
pub fn score(candidate: &Candidate, recent: &RecentReplies) -> i32 {
    let length_bonus = ((candidate.text.chars().count() / CHARS_PER_LENGTH_POINT) as i32)
        .min(MAX_LENGTH_BONUS);
    let question_bonus = if candidate.text.contains('?') {
        QUESTION_BONUS
    } else {
        0
    };
    let penalty = if recent.contains(&candidate.text) {
        RECENT_PENALTY
    } else {
        0
    };
    i32::from(candidate.priority) + length_bonus + question_bonus - penalty
}

/// Choose one reply from `candidates` and record it in `recent`.
///
/// Duplicates are dropped, the rest ranked by [`score`], and the top
/// `shortlist` kept.  Among shortlisted replies not in `recent`, only those of
/// the best priority remain eligible and one of them is drawn uniformly.  If
/// every shortlisted reply is recent, any of them but the very last reply may
/// be drawn.
pub fn select<R: Rng + ?Sized>(
    candidates: &[Candidate],
    recent: &mut RecentReplies,
    shortlist: usize,
    rng: &mut R,
) -> String {
    let mut ranked: Vec<(&Candidate, i32)> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if ranked.iter().all(|(seen, _)| seen.text != c.text) {
            ranked.push((c, score(c, recent)));
        }
    }
    if ranked.is_empty() {
        recent.record(FALLBACK_REPLY);
        return FALLBACK_REPLY.to_string();
    }

    // Stable sort keeps rule order among equal scores.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(shortlist.max(1));

    let fresh: Vec<&Candidate> = ranked
        .iter()
        .map(|(c, _)| *c)
        .filter(|c| !recent.contains(&c.text))
        .collect();

    let pool: Vec<&Candidate> = match fresh.iter().map(|c| c.priority).max() {
        Some(best) => fresh.into_iter().filter(|c| c.priority == best).collect(),
        None => {
            let last = recent.last();
            let older: Vec<&Candidate> = ranked
                .iter()
                .map(|(c, _)| *c)
                .filter(|c| Some(c.text.as_str()) != last)
                .collect();
            if older.is_empty() {
                ranked.iter().map(|(c, _)| *c).collect()
            } else {
                older
            }
        }
    };

    let text = match pool.choose(rng) {
        Some(c) => {
            debug!(rule = c.rule, pool = pool.len(), "reply selected");
            c.text.clone()
        }
        None => FALLBACK_REPLY.to_string(),
    };
    recent.record(&text);
    text
}
