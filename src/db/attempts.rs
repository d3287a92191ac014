//! Completed assessment attempts (user_assessments)

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use super::LogOnError;
use crate::domain::{ScoreCard, ScoredAnswer};

/// One stored attempt, scored at submission time
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
  pub id: i64,
  pub user_id: i64,
  pub assessment_id: i64,
  pub assessment_title: String,
  pub total_score: i64,
  pub max_possible_score: i64,
  pub percentage_score: f64,
  /// Answers with the question text as it read at submission
  pub responses: Vec<ScoredAnswer>,
  pub completed_at: String,
}

/// Attempt row in the admin listing
#[derive(Debug, Clone, Serialize)]
pub struct AttemptListing {
  pub id: i64,
  pub user_id: i64,
  pub user_email: String,
  pub user_name: Option<String>,
  pub assessment_id: i64,
  pub assessment_title: String,
  pub total_score: i64,
  pub max_possible_score: i64,
  pub percentage_score: f64,
  pub completed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptPage {
  pub attempts: Vec<AttemptListing>,
  pub page: u32,
  pub page_size: u32,
  pub total: i64,
  pub total_pages: u32,
}

const ATTEMPT_COLUMNS: &str = r#"ua.id, ua.user_id, ua.assessment_id, fa.title, ua.total_score,
  ua.max_possible_score, ua.percentage_score, ua.responses, ua.completed_at"#;

fn attempt_from_row(row: &Row<'_>) -> Result<AttemptRecord> {
  let raw: String = row.get(7)?;
  let responses = serde_json::from_str::<Vec<ScoredAnswer>>(&raw)
    .log_warn("Failed to decode stored responses")
    .unwrap_or_default();
  Ok(AttemptRecord {
    id: row.get(0)?,
    user_id: row.get(1)?,
    assessment_id: row.get(2)?,
    assessment_title: row.get(3)?,
    total_score: row.get(4)?,
    max_possible_score: row.get(5)?,
    percentage_score: row.get(6)?,
    responses,
    completed_at: row.get(8)?,
  })
}

/// Persist a scored attempt, returns its ID
pub fn insert_attempt(
  conn: &Connection,
  user_id: i64,
  assessment_id: i64,
  card: &ScoreCard,
) -> Result<i64> {
  let responses = serde_json::to_string(&card.responses)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
  let now = Utc::now().to_rfc3339();
  conn.execute(
    r#"INSERT INTO user_assessments
       (user_id, assessment_id, total_score, max_possible_score, percentage_score, responses, completed_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
    params![
      user_id,
      assessment_id,
      card.total_score,
      card.max_possible_score,
      card.percentage_score,
      responses,
      now
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn get_attempt(conn: &Connection, id: i64) -> Result<Option<AttemptRecord>> {
  conn
    .query_row(
      &format!(
        r#"SELECT {} FROM user_assessments ua
           JOIN form_assessments fa ON fa.id = ua.assessment_id
           WHERE ua.id = ?1"#,
        ATTEMPT_COLUMNS
      ),
      params![id],
      attempt_from_row,
    )
    .optional()
}

/// A user's attempts, newest first
pub fn list_attempts_for_user(conn: &Connection, user_id: i64) -> Result<Vec<AttemptRecord>> {
  let mut stmt = conn.prepare(&format!(
    r#"SELECT {} FROM user_assessments ua
       JOIN form_assessments fa ON fa.id = ua.assessment_id
       WHERE ua.user_id = ?1
       ORDER BY ua.completed_at DESC, ua.id DESC"#,
    ATTEMPT_COLUMNS
  ))?;
  let rows = stmt.query_map(params![user_id], attempt_from_row)?;
  rows.collect()
}

pub fn count_attempts(conn: &Connection) -> Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM user_assessments", [], |row| row.get(0))
}

fn listing_from_row(row: &Row<'_>) -> Result<AttemptListing> {
  let first: Option<String> = row.get(3)?;
  let last: Option<String> = row.get(4)?;
  let name = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
  let name = name.trim();
  Ok(AttemptListing {
    id: row.get(0)?,
    user_id: row.get(1)?,
    user_email: row.get(2)?,
    user_name: (!name.is_empty()).then(|| name.to_string()),
    assessment_id: row.get(5)?,
    assessment_title: row.get(6)?,
    total_score: row.get(7)?,
    max_possible_score: row.get(8)?,
    percentage_score: row.get(9)?,
    completed_at: row.get(10)?,
  })
}

const LISTING_QUERY: &str = r#"SELECT ua.id, ua.user_id, p.email, p.first_name, p.last_name,
         ua.assessment_id, fa.title, ua.total_score, ua.max_possible_score,
         ua.percentage_score, ua.completed_at
  FROM user_assessments ua
  JOIN profiles p ON p.id = ua.user_id
  JOIN form_assessments fa ON fa.id = ua.assessment_id
  ORDER BY ua.completed_at DESC, ua.id DESC"#;

/// Most recent attempts across all users
pub fn recent_attempts(conn: &Connection, limit: u32) -> Result<Vec<AttemptListing>> {
  let mut stmt = conn.prepare(&format!("{} LIMIT ?1", LISTING_QUERY))?;
  let rows = stmt.query_map(params![limit], listing_from_row)?;
  rows.collect()
}

/// One page of attempts across all users, newest first. Pages start at 1.
pub fn list_all_attempts(conn: &Connection, page: u32, page_size: u32) -> Result<AttemptPage> {
  let page = page.max(1);
  let page_size = page_size.max(1);
  let total = count_attempts(conn)?;
  let total_pages = (total as u64).div_ceil(page_size as u64) as u32;
  let offset = (page - 1) as i64 * page_size as i64;

  let mut stmt = conn.prepare(&format!("{} LIMIT ?1 OFFSET ?2", LISTING_QUERY))?;
  let attempts = stmt
    .query_map(params![page_size, offset], listing_from_row)?
    .collect::<Result<Vec<_>>>()?;

  Ok(AttemptPage {
    attempts,
    page,
    page_size,
    total,
    total_pages,
  })
}
