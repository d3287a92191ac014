//! Admin score range management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use crate::auth::AdminContext;
use crate::db::{self, try_lock};
use crate::domain::scoring::{max_possible_score, min_possible_score};
use crate::domain::{audit_ranges, RangeDraft, RangeIssue, ScoreRange};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RangeWarning {
  #[serde(flatten)]
  pub issue: RangeIssue,
  pub message: String,
}

/// Ranges of one assessment plus coverage warnings
#[derive(Debug, Serialize)]
pub struct RangeReport {
  pub ranges: Vec<ScoreRange>,
  pub warnings: Vec<RangeWarning>,
}

impl RangeReport {
  pub fn load(conn: &Connection, assessment_id: i64, question_count: usize) -> AppResult<Self> {
    let ranges = db::get_score_ranges(conn, assessment_id)?;
    let warnings = if question_count == 0 {
      Vec::new()
    } else {
      audit_ranges(
        &ranges,
        min_possible_score(question_count),
        max_possible_score(question_count),
      )
      .into_iter()
      .map(|issue| RangeWarning {
        message: issue.message(),
        issue,
      })
      .collect()
    };
    Ok(Self { ranges, warnings })
  }
}

fn report_for(conn: &Connection, assessment_id: i64) -> AppResult<RangeReport> {
  let question_count = db::get_questions(conn, assessment_id)?.len();
  RangeReport::load(conn, assessment_id, question_count)
}

/// GET /api/admin/assessments/{id}/ranges
pub async fn list(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(assessment_id): ApiPath<i64>,
) -> AppResult<Json<RangeReport>> {
  let conn = try_lock(&state.db)?;
  if db::get_assessment(&conn, assessment_id)?.is_none() {
    return Err(AppError::not_found("Assessment"));
  }
  Ok(Json(report_for(&conn, assessment_id)?))
}

/// POST /api/admin/assessments/{id}/ranges - Saved even if it overlaps or leaves gaps
pub async fn create(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(assessment_id): ApiPath<i64>,
  ApiJson(draft): ApiJson<RangeDraft>,
) -> AppResult<(StatusCode, Json<RangeReport>)> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  if db::get_assessment(&conn, assessment_id)?.is_none() {
    return Err(AppError::not_found("Assessment"));
  }
  db::create_score_range(&conn, assessment_id, &draft)?;
  Ok((StatusCode::CREATED, Json(report_for(&conn, assessment_id)?)))
}

/// PUT /api/admin/ranges/{id}
pub async fn update(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
  ApiJson(draft): ApiJson<RangeDraft>,
) -> AppResult<Json<RangeReport>> {
  draft.validate()?;
  let conn = try_lock(&state.db)?;
  let existing = db::get_score_range(&conn, id)?.ok_or_else(|| AppError::not_found("Score range"))?;
  db::update_score_range(&conn, id, &draft)?;
  Ok(Json(report_for(&conn, existing.assessment_id)?))
}

/// DELETE /api/admin/ranges/{id}
pub async fn delete(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
  let conn = try_lock(&state.db)?;
  if !db::delete_score_range(&conn, id)? {
    return Err(AppError::not_found("Score range"));
  }
  Ok(StatusCode::NO_CONTENT)
}
