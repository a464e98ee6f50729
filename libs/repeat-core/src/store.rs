//! Storage contract for the repeat-session engine.
//!
//! The engine never talks to a database directly. A store is expected to be
//! scoped to one unit of work (a transaction in the backend), so every
//! operation sees a consistent snapshot and either all of its writes land or
//! none do.

use std::collections::HashMap;
use std::future::Future;

use crate::error::{EngineError, Result};
use crate::types::{Category, Language, NewRepeatSession, RepeatSession, Word, WordStats};

/// Word, category, language and session persistence used by the engine.
pub trait RepeatStore: Send {
    fn find_language(
        &mut self,
        language_id: i64,
    ) -> impl Future<Output = Result<Option<Language>>> + Send;

    /// Categories of the language among the given ids.
    fn find_categories(
        &mut self,
        language_id: i64,
        category_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// Words belonging to any of the categories, with parts, stats and all
    /// owning categories loaded.
    fn find_words_by_categories(
        &mut self,
        category_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Word>>> + Send;

    /// Words by id, fully loaded. Unknown ids are skipped.
    fn find_words(&mut self, word_ids: &[i64]) -> impl Future<Output = Result<Vec<Word>>> + Send;

    fn find_word(&mut self, word_id: i64) -> impl Future<Output = Result<Option<Word>>> + Send {
        async move {
            let ids = [word_id];
            Ok(self.find_words(&ids).await?.into_iter().next())
        }
    }

    /// Persist the word's own fields (flags and reset time).
    fn save_word(&mut self, word: &Word) -> impl Future<Output = Result<()>> + Send;

    /// Append one grading record to the word's history.
    fn append_stats(
        &mut self,
        word_id: i64,
        stats: &WordStats,
    ) -> impl Future<Output = Result<()>> + Send;

    fn find_session(
        &mut self,
        language_id: i64,
    ) -> impl Future<Output = Result<Option<RepeatSession>>> + Send;

    fn session_exists(&mut self, language_id: i64) -> impl Future<Output = Result<bool>> + Send;

    /// Insert a session. Fails with `SessionAlreadyExists` if the language
    /// already has one.
    fn insert_session(
        &mut self,
        session: NewRepeatSession,
    ) -> impl Future<Output = Result<RepeatSession>> + Send;

    /// Persist the session's queue.
    fn save_session(&mut self, session: &RepeatSession) -> impl Future<Output = Result<()>> + Send;

    fn delete_session(&mut self, session_id: i64) -> impl Future<Output = Result<()>> + Send;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    languages: HashMap<i64, Language>,
    categories: HashMap<i64, Category>,
    words: HashMap<i64, Word>,
    sessions: HashMap<i64, RepeatSession>,
    next_session_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_language(&mut self, language: Language) {
        self.languages.insert(language.id, language);
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn add_word(&mut self, word: Word) {
        self.words.insert(word.id, word);
    }

    pub fn word(&self, word_id: i64) -> Option<&Word> {
        self.words.get(&word_id)
    }

    pub fn session(&self, language_id: i64) -> Option<&RepeatSession> {
        self.sessions.values().find(|s| s.language_id == language_id)
    }

    fn words_sorted<'a>(&self, words: impl Iterator<Item = &'a Word>) -> Vec<Word> {
        let mut found: Vec<Word> = words.cloned().collect();
        found.sort_by_key(|w| w.id);
        found
    }
}

impl RepeatStore for MemoryStore {
    async fn find_language(&mut self, language_id: i64) -> Result<Option<Language>> {
        Ok(self.languages.get(&language_id).cloned())
    }

    async fn find_categories(&mut self, language_id: i64, category_ids: &[i64]) -> Result<Vec<Category>> {
        let mut found: Vec<Category> = category_ids
            .iter()
            .filter_map(|id| self.categories.get(id))
            .filter(|c| c.language_id == language_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.id);
        found.dedup_by_key(|c| c.id);
        Ok(found)
    }

    async fn find_words_by_categories(&mut self, category_ids: &[i64]) -> Result<Vec<Word>> {
        let matching = self
            .words
            .values()
            .filter(|w| w.categories.iter().any(|c| category_ids.contains(&c.id)));
        Ok(self.words_sorted(matching))
    }

    async fn find_words(&mut self, word_ids: &[i64]) -> Result<Vec<Word>> {
        Ok(word_ids
            .iter()
            .filter_map(|id| self.words.get(id))
            .cloned()
            .collect())
    }

    async fn save_word(&mut self, word: &Word) -> Result<()> {
        let stored = self
            .words
            .get_mut(&word.id)
            .ok_or(EngineError::WordNotFound(word.id))?;
        stored.accepted = word.accepted;
        stored.chosen = word.chosen;
        stored.reset_time = word.reset_time;
        Ok(())
    }

    async fn append_stats(&mut self, word_id: i64, stats: &WordStats) -> Result<()> {
        let stored = self
            .words
            .get_mut(&word_id)
            .ok_or(EngineError::WordNotFound(word_id))?;
        stored.stats.push(stats.clone());
        Ok(())
    }

    async fn find_session(&mut self, language_id: i64) -> Result<Option<RepeatSession>> {
        Ok(self.session(language_id).cloned())
    }

    async fn session_exists(&mut self, language_id: i64) -> Result<bool> {
        Ok(self.session(language_id).is_some())
    }

    async fn insert_session(&mut self, session: NewRepeatSession) -> Result<RepeatSession> {
        if self.session(session.language_id).is_some() {
            return Err(EngineError::SessionAlreadyExists(session.language_id));
        }
        self.next_session_id += 1;
        let stored = RepeatSession {
            id: self.next_session_id,
            language_id: session.language_id,
            method: session.method,
            word_queue: session.word_queue,
            created: session.created,
        };
        self.sessions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn save_session(&mut self, session: &RepeatSession) -> Result<()> {
        match self.sessions.get_mut(&session.id) {
            Some(stored) => {
                stored.word_queue = session.word_queue.clone();
                Ok(())
            }
            None => Err(EngineError::SessionNotFound(session.language_id)),
        }
    }

    async fn delete_session(&mut self, session_id: i64) -> Result<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryRef, RepeatMethod};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn word(id: i64, category_id: i64) -> Word {
        Word {
            id,
            accepted: true,
            chosen: false,
            reset_time: Utc::now(),
            comment: None,
            mechanism: None,
            parts: vec![],
            stats: vec![],
            categories: vec![CategoryRef {
                id: category_id,
                method: RepeatMethod::Both,
                mode: "default".into(),
            }],
        }
    }

    fn new_session(language_id: i64) -> NewRepeatSession {
        NewRepeatSession {
            language_id,
            method: RepeatMethod::Both,
            word_queue: vec![1, 2],
            created: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_session_enforces_one_per_language() {
        let mut store = MemoryStore::new();
        let first = store.insert_session(new_session(1)).await.unwrap();
        assert_eq!(first.id, 1);
        let second = store.insert_session(new_session(1)).await;
        assert!(matches!(second, Err(EngineError::SessionAlreadyExists(1))));
        assert!(store.insert_session(new_session(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_words_by_categories() {
        let mut store = MemoryStore::new();
        store.add_word(word(2, 10));
        store.add_word(word(1, 10));
        store.add_word(word(3, 20));
        let ids: Vec<i64> = store
            .find_words_by_categories(&[10])
            .await
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.find_word(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_word_keeps_history() {
        let mut store = MemoryStore::new();
        store.add_word(word(1, 10));
        let mut changed = word(1, 10);
        changed.chosen = true;
        changed.stats.push(WordStats {
            correct: true,
            method: crate::types::Direction::PromptToAnswer,
            answer_time: Utc::now(),
        });
        store.save_word(&changed).await.unwrap();
        let stored = store.word(1).unwrap();
        assert!(stored.chosen);
        assert!(stored.stats.is_empty());
    }
}
