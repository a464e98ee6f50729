//! Repeat-session store backed by a PostgreSQL transaction.

use std::collections::HashMap;

use repeat_core::error::{EngineError, Result};
use repeat_core::store::RepeatStore;
use repeat_core::types::{
    Category, Language, NewRepeatSession, RepeatSession, Word, WordStats,
};
use sqlx::PgConnection;

use crate::models::{
    DbCategory, DbLanguage, DbRepeatSession, DbWord, DbWordCategory, DbWordPart, DbWordStats,
};

/// Store bound to one open transaction.
///
/// Nothing written through it is visible to other requests until the
/// transaction commits.
pub struct PgRepeatStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgRepeatStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Load words with parts, stats and owning categories, keyed by id.
    async fn load_words(&mut self, word_ids: &[i64]) -> Result<HashMap<i64, Word>> {
        if word_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT id, accepted, chosen, reset_time, comment, mechanism
            FROM words
            WHERE id = ANY($1)
            "#,
        )
        .bind(word_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        let mut words: HashMap<i64, Word> = rows.iter().map(|r| (r.id, r.to_core())).collect();

        let parts = sqlx::query_as::<_, DbWordPart>(
            r#"
            SELECT word_id, position, answer, word, speech, basic_word, separator
            FROM word_parts
            WHERE word_id = ANY($1)
            ORDER BY word_id, position
            "#,
        )
        .bind(word_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        for part in &parts {
            if let Some(word) = words.get_mut(&part.word_id) {
                word.parts.push(part.to_core());
            }
        }

        let stats = sqlx::query_as::<_, DbWordStats>(
            r#"
            SELECT word_id, correct, method, answer_time
            FROM word_stats
            WHERE word_id = ANY($1)
            ORDER BY word_id, answer_time, id
            "#,
        )
        .bind(word_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        for stat in &stats {
            if let Some(word) = words.get_mut(&stat.word_id) {
                word.stats.push(stat.to_core());
            }
        }

        let categories = sqlx::query_as::<_, DbWordCategory>(
            r#"
            SELECT wc.word_id, c.id AS category_id, c.method, c.mode
            FROM word_categories wc
            JOIN categories c ON c.id = wc.category_id
            WHERE wc.word_id = ANY($1)
            ORDER BY wc.word_id, c.id
            "#,
        )
        .bind(word_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        for category in &categories {
            if let Some(word) = words.get_mut(&category.word_id) {
                word.categories.push(category.to_core());
            }
        }

        Ok(words)
    }

    async fn session_queue(&mut self, session_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT word_id
            FROM repeat_session_words
            WHERE session_id = $1
            ORDER BY ordinal
            "#,
        )
        .bind(session_id)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)
    }
}

impl RepeatStore for PgRepeatStore<'_> {
    async fn find_language(&mut self, language_id: i64) -> Result<Option<Language>> {
        let row = sqlx::query_as::<_, DbLanguage>(
            r#"
            SELECT id, owner_id, name
            FROM languages
            WHERE id = $1
            "#,
        )
        .bind(language_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(row.map(|r| r.to_core()))
    }

    async fn find_categories(&mut self, language_id: i64, category_ids: &[i64]) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, DbCategory>(
            r#"
            SELECT id, language_id, name, method, mode
            FROM categories
            WHERE language_id = $1 AND id = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(language_id)
        .bind(category_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(rows.iter().map(DbCategory::to_core).collect())
    }

    async fn find_words_by_categories(&mut self, category_ids: &[i64]) -> Result<Vec<Word>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT word_id
            FROM word_categories
            WHERE category_id = ANY($1)
            ORDER BY word_id
            "#,
        )
        .bind(category_ids)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        let mut words = self.load_words(&ids).await?;
        Ok(ids.iter().filter_map(|id| words.remove(id)).collect())
    }

    async fn find_words(&mut self, word_ids: &[i64]) -> Result<Vec<Word>> {
        let mut words = self.load_words(word_ids).await?;
        Ok(word_ids.iter().filter_map(|id| words.remove(id)).collect())
    }

    async fn save_word(&mut self, word: &Word) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE words
            SET accepted = $2, chosen = $3, reset_time = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(word.id)
        .bind(word.accepted)
        .bind(word.chosen)
        .bind(word.reset_time)
        .execute(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(())
    }

    async fn append_stats(&mut self, word_id: i64, stats: &WordStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO word_stats (word_id, correct, method, answer_time)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(word_id)
        .bind(stats.correct)
        .bind(stats.method.as_str())
        .bind(stats.answer_time)
        .execute(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(())
    }

    async fn find_session(&mut self, language_id: i64) -> Result<Option<RepeatSession>> {
        // Lock the row so concurrent answers to the same session serialize.
        let row = sqlx::query_as::<_, DbRepeatSession>(
            r#"
            SELECT id, language_id, method, created
            FROM repeat_sessions
            WHERE language_id = $1
            FOR UPDATE
            "#,
        )
        .bind(language_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        match row {
            Some(row) => {
                let queue = self.session_queue(row.id).await?;
                Ok(Some(row.to_core(queue)))
            }
            None => Ok(None),
        }
    }

    async fn session_exists(&mut self, language_id: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM repeat_sessions WHERE language_id = $1)",
        )
        .bind(language_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(EngineError::storage)
    }

    async fn insert_session(&mut self, session: NewRepeatSession) -> Result<RepeatSession> {
        let inserted = sqlx::query_as::<_, DbRepeatSession>(
            r#"
            INSERT INTO repeat_sessions (language_id, method, created)
            VALUES ($1, $2, $3)
            RETURNING id, language_id, method, created
            "#,
        )
        .bind(session.language_id)
        .bind(session.method.as_str())
        .bind(session.created)
        .fetch_one(&mut *self.conn)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(EngineError::SessionAlreadyExists(session.language_id));
            }
            Err(e) => return Err(EngineError::storage(e)),
        };

        sqlx::query(
            r#"
            INSERT INTO repeat_session_words (session_id, word_id, ordinal)
            SELECT $1, q.word_id, q.ordinal
            FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS q(word_id, ordinal)
            "#,
        )
        .bind(row.id)
        .bind(&session.word_queue)
        .execute(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(row.to_core(session.word_queue))
    }

    async fn save_session(&mut self, session: &RepeatSession) -> Result<()> {
        // The queue only ever shrinks, so dropping the missing entries is enough.
        sqlx::query(
            r#"
            DELETE FROM repeat_session_words
            WHERE session_id = $1 AND word_id <> ALL($2)
            "#,
        )
        .bind(session.id)
        .bind(&session.word_queue)
        .execute(&mut *self.conn)
        .await
        .map_err(EngineError::storage)?;

        Ok(())
    }

    async fn delete_session(&mut self, session_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM repeat_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&mut *self.conn)
            .await
            .map_err(EngineError::storage)?;

        Ok(())
    }
}
