//! Admin assessment and question management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use super::score_ranges::RangeReport;
use crate::auth::AdminContext;
use crate::db::{self, try_lock};
use crate::domain::{Assessment, AssessmentDraft, Question, QuestionDraft};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AdminAssessment {
  #[serde(flatten)]
  pub assessment: Assessment,
  pub questions: Vec<Question>,
  #[serde(flatten)]
  pub ranges: RangeReport,
  pub attempt_count: i64,
}

#[derive(Serialize)]
pub struct ToggleResult {
  pub id: i64,
  pub is_active: bool,
}

fn load(conn: &Connection, id: i64) -> AppResult<AdminAssessment> {
  let assessment = db::get_assessment(conn, id)?.ok_or_else(|| AppError::not_found("Assessment"))?;
  let questions = db::get_questions(conn, id)?;
  let ranges = RangeReport::load(conn, id, questions.len())?;
  Ok(AdminAssessment {
    assessment,
    questions,
    ranges,
    attempt_count: db::count_attempts_for_assessment(conn, id)?,
  })
}

/// GET /api/admin/assessments - All assessments, active or not
pub async fn list(
  State(state): State<AppState>,
  _admin: AdminContext,
) -> AppResult<Json<Vec<Assessment>>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_assessments(&conn)?))
}

/// GET /api/admin/assessments/{id}
pub async fn get(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<AdminAssessment>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(load(&conn, id)?))
}

/// POST /api/admin/assessments
pub async fn create(
  State(state): State<AppState>,
  admin: AdminContext,
  ApiJson(draft): ApiJson<AssessmentDraft>,
) -> AppResult<(StatusCode, Json<AdminAssessment>)> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  let id = db::create_assessment(&conn, &draft)?;
  tracing::info!("Admin {} created assessment {}", admin.user_id(), id);
  Ok((StatusCode::CREATED, Json(load(&conn, id)?)))
}

/// PUT /api/admin/assessments/{id}
pub async fn update(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
  ApiJson(draft): ApiJson<AssessmentDraft>,
) -> AppResult<Json<AdminAssessment>> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  if !db::update_assessment(&conn, id, &draft)? {
    return Err(AppError::not_found("Assessment"));
  }
  Ok(Json(load(&conn, id)?))
}

/// POST /api/admin/assessments/{id}/toggle
pub async fn toggle(
  State(state): State<AppState>,
  admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ToggleResult>> {
  let conn = try_lock(&state.db)?;
  let is_active =
    db::toggle_assessment_active(&conn, id)?.ok_or_else(|| AppError::not_found("Assessment"))?;
  tracing::info!("Admin {} set assessment {} active={}", admin.user_id(), id, is_active);
  Ok(Json(ToggleResult { id, is_active }))
}

/// DELETE /api/admin/assessments/{id} - Refused once attempts reference it
pub async fn delete(
  State(state): State<AppState>,
  admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
  let conn = try_lock(&state.db)?;
  if db::get_assessment(&conn, id)?.is_none() {
    return Err(AppError::not_found("Assessment"));
  }
  let attempts = db::count_attempts_for_assessment(&conn, id)?;
  if attempts > 0 {
    return Err(AppError::Conflict(format!(
      "Assessment has {} completed attempts; deactivate it instead",
      attempts
    )));
  }
  db::delete_assessment(&conn, id)?;
  tracing::info!("Admin {} deleted assessment {}", admin.user_id(), id);
  Ok(StatusCode::NO_CONTENT)
}

// ==================== Questions ====================

fn ensure_order_free(
  conn: &Connection,
  assessment_id: i64,
  draft: &QuestionDraft,
  except_id: Option<i64>,
) -> AppResult<()> {
  if let Some(order) = draft.order {
    if db::question_order_taken(conn, assessment_id, order, except_id)? {
      return Err(AppError::Conflict(format!(
        "Another question already uses order {}",
        order
      )));
    }
  }
  Ok(())
}

/// POST /api/admin/assessments/{id}/questions
pub async fn add_question(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(assessment_id): ApiPath<i64>,
  ApiJson(draft): ApiJson<QuestionDraft>,
) -> AppResult<(StatusCode, Json<Question>)> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  if db::get_assessment(&conn, assessment_id)?.is_none() {
    return Err(AppError::not_found("Assessment"));
  }
  ensure_order_free(&conn, assessment_id, &draft, None)?;

  let id = db::add_question(&conn, assessment_id, &draft)?;
  let question = db::get_question(&conn, id)?.ok_or_else(|| AppError::not_found("Question"))?;
  Ok((StatusCode::CREATED, Json(question)))
}

/// PUT /api/admin/questions/{id}
pub async fn update_question(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
  ApiJson(draft): ApiJson<QuestionDraft>,
) -> AppResult<Json<Question>> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  let existing = db::get_question(&conn, id)?.ok_or_else(|| AppError::not_found("Question"))?;
  ensure_order_free(&conn, existing.assessment_id, &draft, Some(id))?;

  db::update_question(&conn, id, &draft)?;
  let question = db::get_question(&conn, id)?.ok_or_else(|| AppError::not_found("Question"))?;
  Ok(Json(question))
}

/// DELETE /api/admin/questions/{id}
pub async fn delete_question(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
  let conn = try_lock(&state.db)?;
  if !db::delete_question(&conn, id)? {
    return Err(AppError::not_found("Question"));
  }
  Ok(StatusCode::NO_CONTENT)
}
