//! Core types for the repeat-session engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Quiz direction requested by a session or allowed by a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMethod {
    PromptToAnswer,
    AnswerToPrompt,
    Both,
}

impl Default for RepeatMethod {
    fn default() -> Self {
        Self::Both
    }
}

impl RepeatMethod {
    /// Get the method name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PromptToAnswer => "prompt_to_answer",
            Self::AnswerToPrompt => "answer_to_prompt",
            Self::Both => "both",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "prompt_to_answer" => Some(Self::PromptToAnswer),
            "answer_to_prompt" => Some(Self::AnswerToPrompt),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Whether words may be quizzed prompt→answer under this method.
    pub fn permits_prompt_to_answer(self) -> bool {
        matches!(self, Self::PromptToAnswer | Self::Both)
    }

    /// The single direction this method stands for, if it is not `Both`.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::PromptToAnswer => Some(Direction::PromptToAnswer),
            Self::AnswerToPrompt => Some(Direction::AnswerToPrompt),
            Self::Both => None,
        }
    }
}

/// Concrete direction of one presentation or attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    PromptToAnswer,
    AnswerToPrompt,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PromptToAnswer => "prompt_to_answer",
            Self::AnswerToPrompt => "answer_to_prompt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "prompt_to_answer" => Some(Self::PromptToAnswer),
            "answer_to_prompt" => Some(Self::AnswerToPrompt),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::PromptToAnswer => Self::AnswerToPrompt,
            Self::AnswerToPrompt => Self::PromptToAnswer,
        }
    }
}

impl From<Direction> for RepeatMethod {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::PromptToAnswer => Self::PromptToAnswer,
            Direction::AnswerToPrompt => Self::AnswerToPrompt,
        }
    }
}

/// Language owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
}

/// Category as seen by the engine (read-only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub language_id: i64,
    pub name: String,
    pub method: RepeatMethod,
    pub mode: String,
}

impl Category {
    /// Reference carried by the words of this category.
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            method: self.method,
            mode: self.mode.clone(),
        }
    }
}

/// Id-based back-reference from a word to one of its owning categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub method: RepeatMethod,
    pub mode: String,
}

/// One prompt or answer fragment of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPart {
    pub answer: bool,
    pub position: i32,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl WordPart {
    pub fn prompt(position: i32, word: impl Into<String>) -> Self {
        Self {
            answer: false,
            position,
            word: word.into(),
            speech: None,
            basic_word: None,
            separator: None,
        }
    }

    pub fn answer(position: i32, word: impl Into<String>) -> Self {
        Self {
            answer: true,
            ..Self::prompt(position, word)
        }
    }
}

/// Immutable record of one grading attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStats {
    pub correct: bool,
    pub method: Direction,
    pub answer_time: DateTime<Utc>,
}

/// A reviewable vocabulary unit with its owned parts and review history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub accepted: bool,
    pub chosen: bool,
    pub reset_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    pub parts: Vec<WordPart>,
    pub stats: Vec<WordStats>,
    pub categories: Vec<CategoryRef>,
}

impl Word {
    /// Aggregate quiz method of the owning categories.
    ///
    /// A single shared method wins outright. Mixed methods resolve to
    /// prompt→answer when any category permits it, otherwise answer→prompt.
    pub fn category_method(&self) -> RepeatMethod {
        let mut methods = self.categories.iter().map(|c| c.method);
        let Some(first) = methods.next() else {
            return RepeatMethod::Both;
        };
        if self.categories.iter().all(|c| c.method == first) {
            return first;
        }
        if self.categories.iter().any(|c| c.method.permits_prompt_to_answer()) {
            RepeatMethod::PromptToAnswer
        } else {
            RepeatMethod::AnswerToPrompt
        }
    }

    /// Most recent answer time across all attempts.
    pub fn last_answer_time(&self) -> Option<DateTime<Utc>> {
        self.stats.iter().map(|s| s.answer_time).max()
    }

    /// Correct attempts recorded after the current reset time.
    pub fn qualifying_correct(&self) -> impl Iterator<Item = &WordStats> {
        self.stats
            .iter()
            .filter(move |s| s.correct && s.answer_time > self.reset_time)
    }

    /// Presentation mode of the first owning category.
    pub fn category_mode(&self) -> Option<&str> {
        self.categories.first().map(|c| c.mode.as_str())
    }

    /// Parts sorted by position.
    pub fn ordered_parts(&self) -> Vec<WordPart> {
        let mut parts = self.parts.clone();
        parts.sort_by_key(|p| p.position);
        parts
    }
}

/// The active study round of one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatSession {
    pub id: i64,
    pub language_id: i64,
    pub method: RepeatMethod,
    pub word_queue: Vec<i64>,
    pub created: DateTime<Utc>,
}

/// Session about to be persisted (no id yet).
#[derive(Debug, Clone)]
pub struct NewRepeatSession {
    pub language_id: i64,
    pub method: RepeatMethod,
    pub word_queue: Vec<i64>,
    pub created: DateTime<Utc>,
}

/// Request to start a repeat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionForm {
    pub category_ids: Vec<i64>,
    pub requested_count: i64,
    #[serde(default)]
    pub method: RepeatMethod,
    #[serde(default)]
    pub include_chosen: bool,
}

/// Submitted answers for one word, keyed by answer-part position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckAnswerForm {
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub method: Option<Direction>,
}

/// Session view with a freshly computed remaining count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub language_id: i64,
    pub words_left: u32,
    pub method: RepeatMethod,
    pub created: DateTime<Utc>,
}

/// Word drawn for the next question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPresentation {
    pub word_id: i64,
    pub comment: Option<String>,
    pub mechanism: Option<String>,
    pub parts: Vec<WordPart>,
    pub method: Direction,
    pub category_mode: Option<String>,
}

/// Grading detail for one answer position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub position: String,
    pub submitted: Option<String>,
    pub expected: String,
    pub correct: bool,
}

/// Outcome of submitting an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAnswerResult {
    pub correct: bool,
    pub words_left: u32,
    pub session_active: bool,
    pub answers: Vec<AnswerDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word_with(methods: &[RepeatMethod]) -> Word {
        Word {
            id: 1,
            accepted: true,
            chosen: false,
            reset_time: Utc::now(),
            comment: None,
            mechanism: None,
            parts: vec![],
            stats: vec![],
            categories: methods
                .iter()
                .enumerate()
                .map(|(i, m)| CategoryRef {
                    id: i as i64,
                    method: *m,
                    mode: format!("mode{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn shared_category_method_wins() {
        use RepeatMethod::*;
        assert_eq!(word_with(&[Both, Both]).category_method(), Both);
        assert_eq!(word_with(&[AnswerToPrompt]).category_method(), AnswerToPrompt);
    }

    #[test]
    fn mixed_category_methods_prefer_prompt_to_answer() {
        use RepeatMethod::*;
        assert_eq!(
            word_with(&[AnswerToPrompt, PromptToAnswer]).category_method(),
            PromptToAnswer
        );
        assert_eq!(word_with(&[AnswerToPrompt, Both]).category_method(), PromptToAnswer);
    }

    #[test]
    fn word_without_categories_is_both() {
        assert_eq!(word_with(&[]).category_method(), RepeatMethod::Both);
        assert_eq!(word_with(&[]).category_mode(), None);
    }

    #[test]
    fn category_mode_comes_from_first_category() {
        let word = word_with(&[RepeatMethod::Both, RepeatMethod::Both]);
        assert_eq!(word.category_mode(), Some("mode0"));
    }

    #[test]
    fn method_string_round_trip() {
        for method in [
            RepeatMethod::PromptToAnswer,
            RepeatMethod::AnswerToPrompt,
            RepeatMethod::Both,
        ] {
            assert_eq!(RepeatMethod::from_str(method.as_str()), Some(method));
        }
        assert_eq!(RepeatMethod::from_str("sideways"), None);
        assert_eq!(Direction::from_str("both"), None);
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::PromptToAnswer.opposite(), Direction::AnswerToPrompt);
        assert_eq!(Direction::AnswerToPrompt.opposite(), Direction::PromptToAnswer);
    }
}
