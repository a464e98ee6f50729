//! Repeat session lifecycle.
//!
//! A language is either without a session or has exactly one active session.
//! Starting creates it, answering shrinks its queue, and it is deleted when
//! the remaining count reaches zero or on reset.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::matching::check_answers;
use crate::method;
use crate::scheduler::next_reset_time;
use crate::selector::{select_words, SelectionRequest};
use crate::store::RepeatStore;
use crate::types::{
    CheckAnswerForm, CheckAnswerResult, Language, NewRepeatSession, RepeatSession, SessionSummary,
    StartSessionForm, WordPresentation, WordStats,
};

/// Facade over the repeat-session engine for one unit of work.
pub struct SessionManager<S, R> {
    store: S,
    rng: R,
}

impl<S: RepeatStore, R: Rng + Send> SessionManager<S, R> {
    pub fn new(store: S, rng: R) -> Self {
        Self { store, rng }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Start a new session for the caller's language.
    pub async fn start_session(
        &mut self,
        caller: Uuid,
        language_id: i64,
        form: &StartSessionForm,
        now: DateTime<Utc>,
    ) -> Result<SessionSummary> {
        let requested_count = validate_start(form)?;
        self.owned_language(caller, language_id).await?;

        if self.store.session_exists(language_id).await? {
            return Err(EngineError::SessionAlreadyExists(language_id));
        }

        let categories = self
            .store
            .find_categories(language_id, &form.category_ids)
            .await?;
        if categories.is_empty() {
            return Err(EngineError::CategoryNotFound);
        }

        let category_ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        let words = self.store.find_words_by_categories(&category_ids).await?;
        let queue = select_words(
            &categories,
            words,
            SelectionRequest {
                method: form.method,
                include_chosen: form.include_chosen,
                requested_count,
            },
            &mut self.rng,
        )?;
        if queue.is_empty() {
            return Err(EngineError::NoEligibleWords);
        }

        let session = self
            .store
            .insert_session(NewRepeatSession {
                language_id,
                method: form.method,
                word_queue: queue,
                created: now,
            })
            .await?;

        tracing::info!(
            session_id = session.id,
            language_id,
            words = session.word_queue.len(),
            method = session.method.as_str(),
            "started repeat session"
        );

        self.summarize(&session).await
    }

    /// Current session with a recomputed remaining count.
    pub async fn get_active_session(&mut self, caller: Uuid, language_id: i64) -> Result<SessionSummary> {
        self.owned_language(caller, language_id).await?;
        let session = self.active_session(language_id).await?;
        self.summarize(&session).await
    }

    /// Draw a random word from the queue without consuming it.
    pub async fn get_next_word(&mut self, caller: Uuid, language_id: i64) -> Result<WordPresentation> {
        self.owned_language(caller, language_id).await?;
        let session = self.active_session(language_id).await?;

        let word_id = *session
            .word_queue
            .choose(&mut self.rng)
            .ok_or(EngineError::NoMoreWords)?;
        let word = self
            .store
            .find_word(word_id)
            .await?
            .ok_or(EngineError::WordNotFound(word_id))?;

        let direction = method::resolve(session.method, &word, &mut self.rng);
        tracing::debug!(word_id, direction = direction.as_str(), "drew next word");

        Ok(WordPresentation {
            word_id,
            comment: word.comment.clone(),
            mechanism: word.mechanism.clone(),
            parts: word.ordered_parts(),
            method: direction,
            category_mode: word.category_mode().map(str::to_string),
        })
    }

    /// Grade the answers for a queued word and advance the session.
    pub async fn check_answer(
        &mut self,
        caller: Uuid,
        language_id: i64,
        word_id: i64,
        form: &CheckAnswerForm,
        now: DateTime<Utc>,
    ) -> Result<CheckAnswerResult> {
        self.owned_language(caller, language_id).await?;
        let mut session = self.active_session(language_id).await?;

        if !session.word_queue.contains(&word_id) {
            return Err(EngineError::WordNotInSession(word_id));
        }
        let mut word = self
            .store
            .find_word(word_id)
            .await?
            .ok_or(EngineError::WordNotFound(word_id))?;

        let graded = check_answers(&word, &form.answers);
        let direction = match form.method {
            Some(direction) => direction,
            None => method::tag_direction(session.method, &word, &mut self.rng),
        };
        let stats = WordStats {
            correct: graded.is_correct,
            method: direction,
            answer_time: now,
        };
        word.stats.push(stats.clone());
        word.reset_time = next_reset_time(graded.is_correct, word.stats.len(), now);

        session.word_queue.retain(|id| *id != word_id);
        let remaining = self.store.find_words(&session.word_queue).await?;
        let words_left = method::words_left(session.method, &remaining);

        self.store.append_stats(word_id, &stats).await?;
        self.store.save_word(&word).await?;

        let session_active = words_left > 0;
        if session_active {
            self.store.save_session(&session).await?;
        } else {
            self.store.delete_session(session.id).await?;
            tracing::info!(session_id = session.id, language_id, "completed repeat session");
        }

        tracing::debug!(
            word_id,
            correct = graded.is_correct,
            reset_time = %word.reset_time,
            words_left,
            "graded answer"
        );

        Ok(CheckAnswerResult {
            correct: graded.is_correct,
            words_left,
            session_active,
            answers: graded.details,
        })
    }

    /// Cancel the current session.
    ///
    /// Words still queued keep their reset time and history.
    pub async fn reset_session(&mut self, caller: Uuid, language_id: i64) -> Result<()> {
        self.owned_language(caller, language_id).await?;
        let session = self.active_session(language_id).await?;
        self.store.delete_session(session.id).await?;
        tracing::info!(session_id = session.id, language_id, "reset repeat session");
        Ok(())
    }

    async fn owned_language(&mut self, caller: Uuid, language_id: i64) -> Result<Language> {
        let language = self
            .store
            .find_language(language_id)
            .await?
            .ok_or(EngineError::LanguageNotFound(language_id))?;
        if language.owner_id != caller {
            tracing::warn!(language_id, %caller, "language owned by another user");
            return Err(EngineError::AccessDenied(language_id));
        }
        Ok(language)
    }

    async fn active_session(&mut self, language_id: i64) -> Result<RepeatSession> {
        self.store
            .find_session(language_id)
            .await?
            .ok_or(EngineError::SessionNotFound(language_id))
    }

    async fn summarize(&mut self, session: &RepeatSession) -> Result<SessionSummary> {
        let words = self.store.find_words(&session.word_queue).await?;
        Ok(SessionSummary {
            session_id: session.id,
            language_id: session.language_id,
            words_left: method::words_left(session.method, &words),
            method: session.method,
            created: session.created,
        })
    }
}

/// Reject malformed start requests before touching storage.
fn validate_start(form: &StartSessionForm) -> Result<u32> {
    if form.category_ids.is_empty() {
        return Err(EngineError::Validation("at least one category is required".into()));
    }
    if form.requested_count <= 0 {
        return Err(EngineError::Validation("requested count must be positive".into()));
    }
    Ok(u32::try_from(form.requested_count).unwrap_or(u32::MAX))
}
