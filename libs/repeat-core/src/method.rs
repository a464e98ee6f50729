//! Quiz direction resolution and slot accounting.
//!
//! A word reviewed in a `both` session whose categories also allow both
//! directions has to be answered once each way. Every other combination is
//! answered in a single, fixed direction.

use rand::Rng;

use crate::types::{Direction, RepeatMethod, Word};

/// Whether the word has to be drilled in both directions in this session.
pub fn is_bidirectional(session_method: RepeatMethod, category_method: RepeatMethod) -> bool {
    session_method == RepeatMethod::Both && category_method == RepeatMethod::Both
}

/// Slots a word consumes when a session is assembled.
pub fn slot_cost(session_method: RepeatMethod, word: &Word) -> u32 {
    if is_bidirectional(session_method, word.category_method()) {
        2
    } else {
        1
    }
}

/// Slots a queued word still contributes to the remaining count.
pub fn remaining_slots(session_method: RepeatMethod, word: &Word) -> u32 {
    let answered = word.qualifying_correct().count();
    if is_bidirectional(session_method, word.category_method()) {
        match answered {
            0 => 2,
            1 => 1,
            _ => 0,
        }
    } else if answered == 0 {
        1
    } else {
        0
    }
}

/// Sum of remaining slots across the given words.
pub fn words_left<'a>(session_method: RepeatMethod, words: impl IntoIterator<Item = &'a Word>) -> u32 {
    words
        .into_iter()
        .map(|w| remaining_slots(session_method, w))
        .sum()
}

/// Direction in which the word is presented next.
pub fn resolve<R: Rng + ?Sized>(session_method: RepeatMethod, word: &Word, rng: &mut R) -> Direction {
    let category_method = word.category_method();

    if is_bidirectional(session_method, category_method) {
        // Only a force-included chosen word can reach two or more answers;
        // the latest one decides.
        return match word.qualifying_correct().max_by_key(|s| s.answer_time) {
            Some(last) => last.method.opposite(),
            None => random_direction(rng),
        };
    }

    match session_method.direction() {
        Some(direction) => direction,
        None if category_method == RepeatMethod::PromptToAnswer => Direction::PromptToAnswer,
        None => Direction::AnswerToPrompt,
    }
}

/// Direction recorded for an attempt submitted without one.
///
/// In a bidirectional pairing the direction is picked at random; otherwise
/// it is fully resolved.
pub fn tag_direction<R: Rng + ?Sized>(
    session_method: RepeatMethod,
    word: &Word,
    rng: &mut R,
) -> Direction {
    if is_bidirectional(session_method, word.category_method()) {
        random_direction(rng)
    } else {
        resolve(session_method, word, rng)
    }
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    if rng.gen_bool(0.5) {
        Direction::PromptToAnswer
    } else {
        Direction::AnswerToPrompt
    }
}
