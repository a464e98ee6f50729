//! Repeat-session engine shared by the backend and its tests.
//!
//! Provides:
//! - Word selection for new sessions (eligibility, priority buckets, slots)
//! - Quiz direction resolution and remaining-count accounting
//! - Answer checking (trimmed, case-insensitive, all-or-nothing)
//! - Review interval scheduling
//! - Session lifecycle over a pluggable store

pub mod error;
pub mod matching;
pub mod method;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod store;
pub mod types;

pub use error::{EngineError, Result};
pub use matching::{check_answers, CheckResult};
pub use session::SessionManager;
pub use store::{MemoryStore, RepeatStore};
pub use types::{
    AnswerDetail, Category, CategoryRef, CheckAnswerForm, CheckAnswerResult, Direction, Language,
    NewRepeatSession, RepeatMethod, RepeatSession, SessionSummary, StartSessionForm, Word,
    WordPart, WordPresentation, WordStats,
};
