//! Browsing and taking assessments.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::attempts::{build_result, AttemptResult};
use crate::auth::{AuthContext, OptionalAuth};
use crate::db::{self, try_lock};
use crate::domain::scoring::max_possible_score;
use crate::domain::{
  response_options, score_responses, Assessment, Question, Response, ResponseOption,
};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

pub const UPGRADE_HINT: &str = "Upgrade to Premium to take assessments and view results";

#[derive(Serialize)]
pub struct AssessmentSummary {
  #[serde(flatten)]
  pub assessment: Assessment,
  /// Present only for signed-in callers
  #[serde(skip_serializing_if = "Option::is_none")]
  pub can_take: Option<bool>,
}

#[derive(Serialize)]
pub struct AssessmentDetail {
  #[serde(flatten)]
  pub assessment: Assessment,
  pub questions: Vec<Question>,
  pub response_options: Vec<ResponseOption>,
  pub max_possible_score: i64,
}

#[derive(Deserialize)]
pub struct SubmitForm {
  /// question order -> answer
  pub responses: BTreeMap<u32, Response>,
}

/// GET /api/assessments - Active assessments
pub async fn list_assessments(
  State(state): State<AppState>,
  OptionalAuth(auth): OptionalAuth,
) -> AppResult<Json<Vec<AssessmentSummary>>> {
  let can_take = auth.map(|a| a.profile.can_take_assessments());
  let conn = try_lock(&state.db)?;
  let summaries = db::list_active_assessments(&conn)?
    .into_iter()
    .map(|assessment| AssessmentSummary {
      assessment,
      can_take,
    })
    .collect();
  Ok(Json(summaries))
}

/// GET /api/assessments/{id} - Active assessment with its questions
pub async fn get_assessment(
  State(state): State<AppState>,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<AssessmentDetail>> {
  let conn = try_lock(&state.db)?;
  let assessment =
    db::get_active_assessment(&conn, id)?.ok_or_else(|| AppError::not_found("Assessment"))?;
  let questions = db::get_questions(&conn, id)?;

  Ok(Json(AssessmentDetail {
    assessment,
    max_possible_score: max_possible_score(questions.len()),
    questions,
    response_options: response_options(),
  }))
}

/// POST /api/assessments/{id}/attempts - Score and record a submission
pub async fn submit_attempt(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<i64>,
  ApiJson(form): ApiJson<SubmitForm>,
) -> AppResult<(StatusCode, Json<AttemptResult>)> {
  if !auth.profile.can_take_assessments() {
    return Err(AppError::Forbidden(UPGRADE_HINT.to_string()));
  }

  let conn = try_lock(&state.db)?;
  db::get_active_assessment(&conn, id)?.ok_or_else(|| AppError::not_found("Assessment"))?;
  let questions = db::get_questions(&conn, id)?;
  let card = score_responses(&questions, &form.responses)?;

  let attempt_id = db::insert_attempt(&conn, auth.user_id(), id, &card)?;
  tracing::info!(
    "User {} completed assessment {}: {}/{} ({}%)",
    auth.user_id(),
    id,
    card.total_score,
    card.max_possible_score,
    card.percentage_score
  );

  let attempt = db::get_attempt(&conn, attempt_id)?.ok_or_else(|| AppError::not_found("Attempt"))?;
  let result = build_result(&conn, attempt)?;
  Ok((StatusCode::CREATED, Json(result)))
}
