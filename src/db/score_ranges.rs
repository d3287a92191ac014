//! Admin-defined score ranges

use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{RangeDraft, ScoreRange};

fn range_from_row(row: &Row<'_>) -> Result<ScoreRange> {
  Ok(ScoreRange {
    id: row.get(0)?,
    assessment_id: row.get(1)?,
    min_score: row.get(2)?,
    max_score: row.get(3)?,
    status: row.get(4)?,
    interpretation: row.get(5)?,
  })
}

/// Ranges for an assessment, lowest `min_score` first
pub fn get_score_ranges(conn: &Connection, assessment_id: i64) -> Result<Vec<ScoreRange>> {
  let mut stmt = conn.prepare(
    r#"SELECT id, assessment_id, min_score, max_score, status, interpretation
       FROM assessment_score_ranges
       WHERE assessment_id = ?1
       ORDER BY min_score, id"#,
  )?;
  let rows = stmt.query_map(params![assessment_id], range_from_row)?;
  rows.collect()
}

pub fn get_score_range(conn: &Connection, id: i64) -> Result<Option<ScoreRange>> {
  conn
    .query_row(
      r#"SELECT id, assessment_id, min_score, max_score, status, interpretation
         FROM assessment_score_ranges WHERE id = ?1"#,
      params![id],
      range_from_row,
    )
    .optional()
}

pub fn create_score_range(conn: &Connection, assessment_id: i64, draft: &RangeDraft) -> Result<i64> {
  conn.execute(
    r#"INSERT INTO assessment_score_ranges (assessment_id, min_score, max_score, status, interpretation)
       VALUES (?1, ?2, ?3, ?4, ?5)"#,
    params![
      assessment_id,
      draft.min_score,
      draft.max_score,
      draft.status.trim(),
      draft.interpretation.trim()
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_score_range(conn: &Connection, id: i64, draft: &RangeDraft) -> Result<bool> {
  let changed = conn.execute(
    r#"UPDATE assessment_score_ranges
       SET min_score = ?1, max_score = ?2, status = ?3, interpretation = ?4
       WHERE id = ?5"#,
    params![
      draft.min_score,
      draft.max_score,
      draft.status.trim(),
      draft.interpretation.trim(),
      id
    ],
  )?;
  Ok(changed > 0)
}

pub fn delete_score_range(conn: &Connection, id: i64) -> Result<bool> {
  let changed = conn.execute(
    "DELETE FROM assessment_score_ranges WHERE id = ?1",
    params![id],
  )?;
  Ok(changed > 0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::create_assessment;
  use crate::domain::{interpret, AssessmentDraft};
  use crate::testing::TestEnv;

  fn range(min_score: i64, max_score: i64, status: &str) -> RangeDraft {
    RangeDraft {
      min_score,
      max_score,
      status: status.to_string(),
      interpretation: format!("{} text", status),
    }
  }

  fn assessment(env: &TestEnv) -> i64 {
    create_assessment(
      &env.conn,
      &AssessmentDraft {
        title: "A".into(),
        description: String::new(),
      },
    )
    .unwrap()
  }

  #[test]
  fn test_ranges_come_back_sorted_by_min() {
    let env = TestEnv::new().unwrap();
    let id = assessment(&env);
    create_score_range(&env.conn, id, &range(17, 20, "Ready to Grow")).unwrap();
    create_score_range(&env.conn, id, &range(-10, 4, "Needs Clarity")).unwrap();
    create_score_range(&env.conn, id, &range(12, 16, "Needs Fine-Tuning")).unwrap();
    create_score_range(&env.conn, id, &range(5, 11, "Needs Structuring")).unwrap();

    let ranges = get_score_ranges(&env.conn, id).unwrap();
    let mins: Vec<i64> = ranges.iter().map(|r| r.min_score).collect();
    assert_eq!(mins, vec![-10, 5, 12, 17]);
    assert_eq!(interpret(15, &ranges).unwrap().status, "Needs Fine-Tuning");
  }

  #[test]
  fn test_update_and_delete_range() {
    let env = TestEnv::new().unwrap();
    let id = assessment(&env);
    let range_id = create_score_range(&env.conn, id, &range(0, 5, "Low")).unwrap();

    assert!(update_score_range(&env.conn, range_id, &range(0, 8, "Lower")).unwrap());
    let stored = get_score_range(&env.conn, range_id).unwrap().unwrap();
    assert_eq!((stored.max_score, stored.status.as_str()), (8, "Lower"));

    assert!(delete_score_range(&env.conn, range_id).unwrap());
    assert!(get_score_range(&env.conn, range_id).unwrap().is_none());
    assert!(!update_score_range(&env.conn, range_id, &range(0, 1, "x")).unwrap());
  }
}
