//! Attempt results and history.

use axum::extract::State;
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use super::assessments::UPGRADE_HINT;
use crate::auth::AuthContext;
use crate::db::{self, try_lock, AttemptRecord};
use crate::domain::scoring::{scale_position, MAX_POINTS_PER_QUESTION};
use crate::domain::{interpret, Response, ResponseBreakdown, ScoreRange};
use crate::error::{AppError, AppResult};
use crate::extract::ApiPath;
use crate::state::AppState;

/// One answered question as shown on the results page
#[derive(Debug, Serialize)]
pub struct AnswerSummary {
  pub order: u32,
  /// Question text as it read when the attempt was submitted
  pub question: String,
  pub response: Option<Response>,
  pub label: Option<&'static str>,
  pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct MatchedRange {
  pub status: String,
  pub interpretation: String,
  pub min_score: i64,
  pub max_score: i64,
}

#[derive(Debug, Serialize)]
pub struct AttemptResult {
  pub attempt: AttemptRecord,
  /// None when no configured range contains the total
  pub range: Option<MatchedRange>,
  /// 0..=100 on the attainable scale, for progress display
  pub scale_position: f64,
  pub breakdown: ResponseBreakdown,
  pub answers: Vec<AnswerSummary>,
  /// Every range of the assessment, lowest first
  pub ranges: Vec<ScoreRange>,
}

/// Interpret a stored attempt against the assessment's current ranges
pub fn build_result(conn: &Connection, attempt: AttemptRecord) -> AppResult<AttemptResult> {
  let ranges = db::get_score_ranges(conn, attempt.assessment_id)?;

  let range = interpret(attempt.total_score, &ranges).map(|r| MatchedRange {
    status: r.status.clone(),
    interpretation: r.interpretation.clone(),
    min_score: r.min_score,
    max_score: r.max_score,
  });
  if range.is_none() {
    tracing::warn!(
      "No score range matches {} for assessment {}",
      attempt.total_score,
      attempt.assessment_id
    );
  }

  // Frozen at submission, so the scale follows the stored maximum
  let question_count = (attempt.max_possible_score / MAX_POINTS_PER_QUESTION).max(0) as usize;

  let answers = attempt
    .responses
    .iter()
    .map(|answer| {
      let response = Response::from_score(answer.score);
      AnswerSummary {
        order: answer.order,
        question: answer.question_text.clone(),
        response,
        label: response.map(|r| r.label()),
        score: answer.score,
      }
    })
    .collect();

  Ok(AttemptResult {
    range,
    scale_position: scale_position(attempt.total_score, question_count),
    breakdown: ResponseBreakdown::from_scores(attempt.responses.iter().map(|a| &a.score)),
    answers,
    ranges,
    attempt,
  })
}

/// GET /api/attempts/{id} - Result for the owner (Premium) or an admin
pub async fn get_attempt_result(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<AttemptResult>> {
  let conn = try_lock(&state.db)?;
  let attempt = db::get_attempt(&conn, id)?
    .filter(|a| a.user_id == auth.user_id() || auth.profile.is_admin())
    .ok_or_else(|| AppError::not_found("Attempt"))?;

  if !auth.profile.can_take_assessments() {
    return Err(AppError::Forbidden(UPGRADE_HINT.to_string()));
  }

  Ok(Json(build_result(&conn, attempt)?))
}

/// GET /api/me/attempts - Caller's attempt history, newest first
pub async fn my_attempts(
  State(state): State<AppState>,
  auth: AuthContext,
) -> AppResult<Json<Vec<AttemptRecord>>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_attempts_for_user(&conn, auth.user_id())?))
}
