//! Word selection for new repeat sessions.
//!
//! Selection runs in four steps: category eligibility, word eligibility,
//! prioritization into buckets, and slot-based truncation. The surviving
//! queue is reshuffled so that priority only decides membership.

use std::collections::{HashMap, HashSet};

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{EngineError, Result};
use crate::method::slot_cost;
use crate::types::{Category, RepeatMethod, Word};

/// Width of the window before a reset time in which misses raise priority.
pub const PRIORITY_WINDOW_HOURS: i64 = 3;

/// Parameters of one selection run.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest {
    pub method: RepeatMethod,
    pub include_chosen: bool,
    pub requested_count: u32,
}

/// Categories whose method is compatible with the session method.
pub fn eligible_categories(categories: &[Category], method: RepeatMethod) -> Vec<&Category> {
    categories
        .iter()
        .filter(|c| {
            method == RepeatMethod::Both || c.method == RepeatMethod::Both || c.method == method
        })
        .collect()
}

/// Whether a word has already been answered since its reset time.
///
/// Force-included chosen words are never done.
pub fn is_done(word: &Word, include_chosen: bool) -> bool {
    if include_chosen && word.chosen {
        return false;
    }
    match word.last_answer_time() {
        Some(last) => last > word.reset_time,
        None => false,
    }
}

/// Incorrect answers given shortly before the word's reset time.
pub fn recent_misses(word: &Word) -> usize {
    let window_start = word.reset_time - Duration::hours(PRIORITY_WINDOW_HOURS);
    word.stats
        .iter()
        .filter(|s| !s.correct && s.answer_time > window_start && s.answer_time < word.reset_time)
        .count()
}

/// Build the word queue for a new session.
///
/// `words` are the words of the requested categories; words outside the
/// eligible categories are ignored. Returns the selected word ids in random
/// order.
pub fn select_words<R: Rng + ?Sized>(
    categories: &[Category],
    words: Vec<Word>,
    request: SelectionRequest,
    rng: &mut R,
) -> Result<Vec<i64>> {
    let eligible = eligible_categories(categories, request.method);
    if eligible.is_empty() {
        return Err(EngineError::CategoryNotFound);
    }
    let eligible_ids: HashSet<i64> = eligible.iter().map(|c| c.id).collect();

    let candidates = eligible_words(words, &eligible_ids, request.include_chosen);
    tracing::debug!(
        candidates = candidates.len(),
        categories = eligible_ids.len(),
        "filtered repeat candidates"
    );

    let prioritized = prioritize(candidates, request.include_chosen, rng);
    let mut queue = truncate_to_slots(prioritized, request.method, request.requested_count);
    queue.shuffle(rng);

    Ok(queue.into_iter().map(|w| w.id).collect())
}

fn eligible_words(words: Vec<Word>, category_ids: &HashSet<i64>, include_chosen: bool) -> Vec<Word> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|w| w.categories.iter().any(|c| category_ids.contains(&c.id)))
        .filter(|w| seen.insert(w.id))
        .filter(|w| w.accepted && !is_done(w, include_chosen))
        .collect()
}

/// Order candidates as chosen, then recently missed, then the rest.
fn prioritize<R: Rng + ?Sized>(words: Vec<Word>, include_chosen: bool, rng: &mut R) -> Vec<Word> {
    let mut chosen = Vec::new();
    let mut priority = Vec::new();
    let mut normal = Vec::new();

    for word in words {
        if include_chosen && word.chosen {
            chosen.push(word);
        } else if recent_misses(&word) > 0 {
            priority.push(word);
        } else {
            normal.push(word);
        }
    }

    chosen.shuffle(rng);
    normal.shuffle(rng);

    // Shuffle first so that equal miss counts come out in random order.
    priority.shuffle(rng);
    let misses: HashMap<i64, usize> = priority.iter().map(|w| (w.id, recent_misses(w))).collect();
    priority.sort_by(|a, b| misses[&b.id].cmp(&misses[&a.id]));

    chosen.into_iter().chain(priority).chain(normal).collect()
}

/// Take words until their slot total reaches the requested count.
fn truncate_to_slots(words: Vec<Word>, method: RepeatMethod, requested: u32) -> Vec<Word> {
    let mut total = 0;
    let mut taken = Vec::new();
    for word in words {
        if total >= requested {
            break;
        }
        total += slot_cost(method, &word);
        taken.push(word);
    }
    taken
}
