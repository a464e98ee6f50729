//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from repeat-core
pub use repeat_core::types::{
    AnswerDetail, Category, CategoryRef, CheckAnswerForm, CheckAnswerResult, Direction, Language,
    RepeatMethod, RepeatSession, SessionSummary, StartSessionForm, Word, WordPart,
    WordPresentation, WordStats,
};

// === Database Entity Types ===

/// Caller identified by bearer token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Language stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbLanguage {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
}

impl DbLanguage {
    pub fn to_core(&self) -> Language {
        Language {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
        }
    }
}

/// Category stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbCategory {
    pub id: i64,
    pub language_id: i64,
    pub name: String,
    pub method: String,
    pub mode: String,
}

impl DbCategory {
    pub fn to_core(&self) -> Category {
        Category {
            id: self.id,
            language_id: self.language_id,
            name: self.name.clone(),
            method: RepeatMethod::from_str(&self.method).unwrap_or_default(),
            mode: self.mode.clone(),
        }
    }
}

/// Word row without its child records
#[derive(Debug, Clone, FromRow)]
pub struct DbWord {
    pub id: i64,
    pub accepted: bool,
    pub chosen: bool,
    pub reset_time: DateTime<Utc>,
    pub comment: Option<String>,
    pub mechanism: Option<String>,
}

impl DbWord {
    /// Core word with empty child collections.
    pub fn to_core(&self) -> Word {
        Word {
            id: self.id,
            accepted: self.accepted,
            chosen: self.chosen,
            reset_time: self.reset_time,
            comment: self.comment.clone(),
            mechanism: self.mechanism.clone(),
            parts: Vec::new(),
            stats: Vec::new(),
            categories: Vec::new(),
        }
    }
}

/// Word part row
#[derive(Debug, Clone, FromRow)]
pub struct DbWordPart {
    pub word_id: i64,
    pub position: i32,
    pub answer: bool,
    pub word: String,
    pub speech: Option<String>,
    pub basic_word: Option<String>,
    pub separator: Option<String>,
}

impl DbWordPart {
    pub fn to_core(&self) -> WordPart {
        WordPart {
            answer: self.answer,
            position: self.position,
            word: self.word.clone(),
            speech: self.speech.clone(),
            basic_word: self.basic_word.clone(),
            separator: self.separator.clone(),
        }
    }
}

/// Grading record row
#[derive(Debug, Clone, FromRow)]
pub struct DbWordStats {
    pub word_id: i64,
    pub correct: bool,
    pub method: String,
    pub answer_time: DateTime<Utc>,
}

impl DbWordStats {
    pub fn to_core(&self) -> WordStats {
        WordStats {
            correct: self.correct,
            method: Direction::from_str(&self.method).unwrap_or(Direction::PromptToAnswer),
            answer_time: self.answer_time,
        }
    }
}

/// Owning category of a word, joined with the category's attributes
#[derive(Debug, Clone, FromRow)]
pub struct DbWordCategory {
    pub word_id: i64,
    pub category_id: i64,
    pub method: String,
    pub mode: String,
}

impl DbWordCategory {
    pub fn to_core(&self) -> CategoryRef {
        CategoryRef {
            id: self.category_id,
            method: RepeatMethod::from_str(&self.method).unwrap_or_default(),
            mode: self.mode.clone(),
        }
    }
}

/// Repeat session row (queue stored separately)
#[derive(Debug, Clone, FromRow)]
pub struct DbRepeatSession {
    pub id: i64,
    pub language_id: i64,
    pub method: String,
    pub created: DateTime<Utc>,
}

impl DbRepeatSession {
    pub fn to_core(&self, word_queue: Vec<i64>) -> RepeatSession {
        RepeatSession {
            id: self.id,
            language_id: self.language_id,
            method: RepeatMethod::from_str(&self.method).unwrap_or_default(),
            word_queue,
            created: self.created,
        }
    }
}
