//! Repeat-session service.
//!
//! Each operation runs inside its own transaction. Engine errors drop the
//! transaction before commit, so a failed request leaves no partial writes.

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use repeat_core::SessionManager;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::db::{Database, PgRepeatStore};
use crate::error::Result;
use crate::models::{
    CheckAnswerForm, CheckAnswerResult, SessionSummary, StartSessionForm, WordPresentation,
};

fn manager(conn: &mut PgConnection) -> SessionManager<PgRepeatStore<'_>, StdRng> {
    SessionManager::new(PgRepeatStore::new(conn), StdRng::from_entropy())
}

/// Build a queue from the chosen categories and store the session.
pub async fn start_session(
    db: &Database,
    caller: Uuid,
    language_id: i64,
    form: &StartSessionForm,
) -> Result<SessionSummary> {
    let mut tx = db.begin().await?;
    let summary = manager(&mut tx)
        .start_session(caller, language_id, form, Utc::now())
        .await?;
    tx.commit().await?;
    Ok(summary)
}

pub async fn get_active_session(
    db: &Database,
    caller: Uuid,
    language_id: i64,
) -> Result<SessionSummary> {
    let mut tx = db.begin().await?;
    let summary = manager(&mut tx)
        .get_active_session(caller, language_id)
        .await?;
    tx.commit().await?;
    Ok(summary)
}

pub async fn get_next_word(
    db: &Database,
    caller: Uuid,
    language_id: i64,
) -> Result<WordPresentation> {
    let mut tx = db.begin().await?;
    let presentation = manager(&mut tx).get_next_word(caller, language_id).await?;
    tx.commit().await?;
    Ok(presentation)
}

/// Grade an answer, record it and advance the queue.
pub async fn check_answer(
    db: &Database,
    caller: Uuid,
    language_id: i64,
    word_id: i64,
    form: &CheckAnswerForm,
) -> Result<CheckAnswerResult> {
    let mut tx = db.begin().await?;
    let result = manager(&mut tx)
        .check_answer(caller, language_id, word_id, form, Utc::now())
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn reset_session(db: &Database, caller: Uuid, language_id: i64) -> Result<()> {
    let mut tx = db.begin().await?;
    manager(&mut tx).reset_session(caller, language_id).await?;
    tx.commit().await?;
    Ok(())
}
