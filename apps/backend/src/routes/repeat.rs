//! Repeat-session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::repeat;
use crate::AppState;

/// POST /api/languages/:language_id/repeat
pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(language_id): Path<i64>,
    Json(form): Json<StartSessionForm>,
) -> Result<(StatusCode, Json<SessionSummary>)> {
    let summary = repeat::start_session(&state.db, auth.user_id, language_id, &form).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/languages/:language_id/repeat
pub async fn current(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(language_id): Path<i64>,
) -> Result<Json<SessionSummary>> {
    let summary = repeat::get_active_session(&state.db, auth.user_id, language_id).await?;
    Ok(Json(summary))
}

/// GET /api/languages/:language_id/repeat/next-word
pub async fn next_word(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(language_id): Path<i64>,
) -> Result<Json<WordPresentation>> {
    let word = repeat::get_next_word(&state.db, auth.user_id, language_id).await?;
    Ok(Json(word))
}

/// POST /api/languages/:language_id/repeat/words/:word_id/answer
pub async fn check_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((language_id, word_id)): Path<(i64, i64)>,
    Json(form): Json<CheckAnswerForm>,
) -> Result<Json<CheckAnswerResult>> {
    let result =
        repeat::check_answer(&state.db, auth.user_id, language_id, word_id, &form).await?;
    Ok(Json(result))
}

/// DELETE /api/languages/:language_id/repeat
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(language_id): Path<i64>,
) -> Result<StatusCode> {
    repeat::reset_session(&state.db, auth.user_id, language_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
