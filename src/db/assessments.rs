//! Assessments and their questions

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{Assessment, AssessmentDraft, Question, QuestionDraft};

const ASSESSMENT_COLUMNS: &str =
  "id, title, description, total_questions, is_active, created_at, updated_at";

fn assessment_from_row(row: &Row<'_>) -> Result<Assessment> {
  Ok(Assessment {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    total_questions: row.get(3)?,
    is_active: row.get::<_, i64>(4)? == 1,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

fn question_from_row(row: &Row<'_>) -> Result<Question> {
  Ok(Question {
    id: row.get(0)?,
    assessment_id: row.get(1)?,
    text: row.get(2)?,
    order: row.get(3)?,
  })
}

// ==================== Assessments ====================

/// All assessments, newest first
pub fn list_assessments(conn: &Connection) -> Result<Vec<Assessment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM form_assessments ORDER BY created_at DESC, id DESC",
    ASSESSMENT_COLUMNS
  ))?;
  let rows = stmt.query_map([], assessment_from_row)?;
  rows.collect()
}

/// Active assessments, newest first
pub fn list_active_assessments(conn: &Connection) -> Result<Vec<Assessment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM form_assessments WHERE is_active = 1 ORDER BY created_at DESC, id DESC",
    ASSESSMENT_COLUMNS
  ))?;
  let rows = stmt.query_map([], assessment_from_row)?;
  rows.collect()
}

pub fn get_assessment(conn: &Connection, id: i64) -> Result<Option<Assessment>> {
  conn
    .query_row(
      &format!("SELECT {} FROM form_assessments WHERE id = ?1", ASSESSMENT_COLUMNS),
      params![id],
      assessment_from_row,
    )
    .optional()
}

/// Assessment only if it is active
pub fn get_active_assessment(conn: &Connection, id: i64) -> Result<Option<Assessment>> {
  Ok(get_assessment(conn, id)?.filter(|a| a.is_active))
}

pub fn create_assessment(conn: &Connection, draft: &AssessmentDraft) -> Result<i64> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO form_assessments (title, description, total_questions, is_active, created_at, updated_at)
     VALUES (?1, ?2, 0, 1, ?3, ?3)",
    params![draft.title.trim(), draft.description, now],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Returns false if the assessment does not exist
pub fn update_assessment(conn: &Connection, id: i64, draft: &AssessmentDraft) -> Result<bool> {
  let now = Utc::now().to_rfc3339();
  let changed = conn.execute(
    "UPDATE form_assessments SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
    params![draft.title.trim(), draft.description, now, id],
  )?;
  Ok(changed > 0)
}

/// Flip `is_active`, returning the new value (None if missing)
pub fn toggle_assessment_active(conn: &Connection, id: i64) -> Result<Option<bool>> {
  let now = Utc::now().to_rfc3339();
  let changed = conn.execute(
    "UPDATE form_assessments SET is_active = 1 - is_active, updated_at = ?1 WHERE id = ?2",
    params![now, id],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  Ok(get_assessment(conn, id)?.map(|a| a.is_active))
}

/// Number of attempts recorded against an assessment
pub fn count_attempts_for_assessment(conn: &Connection, id: i64) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM user_assessments WHERE assessment_id = ?1",
    params![id],
    |row| row.get(0),
  )
}

/// Delete an assessment with its questions and ranges (cascade).
/// Callers must check for attempts first; the foreign key refuses otherwise.
pub fn delete_assessment(conn: &Connection, id: i64) -> Result<bool> {
  let changed = conn.execute("DELETE FROM form_assessments WHERE id = ?1", params![id])?;
  Ok(changed > 0)
}

// ==================== Questions ====================

/// Questions ordered by `question_order`
pub fn get_questions(conn: &Connection, assessment_id: i64) -> Result<Vec<Question>> {
  let mut stmt = conn.prepare(
    r#"SELECT id, assessment_id, question_text, question_order
       FROM assessment_questions
       WHERE assessment_id = ?1
       ORDER BY question_order"#,
  )?;
  let rows = stmt.query_map(params![assessment_id], question_from_row)?;
  rows.collect()
}

pub fn get_question(conn: &Connection, id: i64) -> Result<Option<Question>> {
  conn
    .query_row(
      r#"SELECT id, assessment_id, question_text, question_order
         FROM assessment_questions WHERE id = ?1"#,
      params![id],
      question_from_row,
    )
    .optional()
}

fn next_question_order(conn: &Connection, assessment_id: i64) -> Result<u32> {
  conn.query_row(
    "SELECT COALESCE(MAX(question_order), 0) + 1 FROM assessment_questions WHERE assessment_id = ?1",
    params![assessment_id],
    |row| row.get(0),
  )
}

pub fn question_order_taken(
  conn: &Connection,
  assessment_id: i64,
  order: u32,
  except_id: Option<i64>,
) -> Result<bool> {
  let count: i64 = conn.query_row(
    r#"SELECT COUNT(*) FROM assessment_questions
       WHERE assessment_id = ?1 AND question_order = ?2 AND id != COALESCE(?3, -1)"#,
    params![assessment_id, order, except_id],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}

/// Keep `total_questions` equal to the real question count
fn sync_question_count(conn: &Connection, assessment_id: i64) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    r#"UPDATE form_assessments
       SET total_questions = (SELECT COUNT(*) FROM assessment_questions WHERE assessment_id = ?1),
           updated_at = ?2
       WHERE id = ?1"#,
    params![assessment_id, now],
  )?;
  Ok(())
}

pub fn add_question(conn: &Connection, assessment_id: i64, draft: &QuestionDraft) -> Result<i64> {
  let order = match draft.order {
    Some(order) => order,
    None => next_question_order(conn, assessment_id)?,
  };
  let tx = conn.unchecked_transaction()?;
  tx.execute(
    "INSERT INTO assessment_questions (assessment_id, question_text, question_order) VALUES (?1, ?2, ?3)",
    params![assessment_id, draft.text.trim(), order],
  )?;
  let id = tx.last_insert_rowid();
  sync_question_count(&tx, assessment_id)?;
  tx.commit()?;
  Ok(id)
}

pub fn update_question(conn: &Connection, id: i64, draft: &QuestionDraft) -> Result<bool> {
  let changed = match draft.order {
    Some(order) => conn.execute(
      "UPDATE assessment_questions SET question_text = ?1, question_order = ?2 WHERE id = ?3",
      params![draft.text.trim(), order, id],
    )?,
    None => conn.execute(
      "UPDATE assessment_questions SET question_text = ?1 WHERE id = ?2",
      params![draft.text.trim(), id],
    )?,
  };
  Ok(changed > 0)
}

pub fn delete_question(conn: &Connection, id: i64) -> Result<bool> {
  let Some(question) = get_question(conn, id)? else {
    return Ok(false);
  };
  let tx = conn.unchecked_transaction()?;
  tx.execute("DELETE FROM assessment_questions WHERE id = ?1", params![id])?;
  sync_question_count(&tx, question.assessment_id)?;
  tx.commit()?;
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  fn draft(title: &str) -> AssessmentDraft {
    AssessmentDraft {
      title: title.to_string(),
      description: "desc".to_string(),
    }
  }

  fn question(text: &str, order: Option<u32>) -> QuestionDraft {
    QuestionDraft {
      text: text.to_string(),
      order,
    }
  }

  #[test]
  fn test_create_and_list_assessments() {
    let env = TestEnv::new().unwrap();
    let first = create_assessment(&env.conn, &draft("First")).unwrap();
    let second = create_assessment(&env.conn, &draft("  Second  ")).unwrap();

    let all = list_assessments(&env.conn).unwrap();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0].id, second);
    assert_eq!(all[0].title, "Second");
    assert_eq!(all[1].id, first);
    assert!(all.iter().all(|a| a.is_active && a.total_questions == 0));
  }

  #[test]
  fn test_toggle_hides_from_active_list() {
    let env = TestEnv::new().unwrap();
    let id = create_assessment(&env.conn, &draft("A")).unwrap();

    assert_eq!(toggle_assessment_active(&env.conn, id).unwrap(), Some(false));
    assert!(list_active_assessments(&env.conn).unwrap().is_empty());
    assert!(get_active_assessment(&env.conn, id).unwrap().is_none());

    assert_eq!(toggle_assessment_active(&env.conn, id).unwrap(), Some(true));
    assert_eq!(list_active_assessments(&env.conn).unwrap().len(), 1);
    assert_eq!(toggle_assessment_active(&env.conn, 999).unwrap(), None);
  }

  #[test]
  fn test_questions_keep_order_and_count_in_sync() {
    let env = TestEnv::new().unwrap();
    let id = create_assessment(&env.conn, &draft("A")).unwrap();

    add_question(&env.conn, id, &question("second", Some(2))).unwrap();
    add_question(&env.conn, id, &question("first", Some(1))).unwrap();
    let third = add_question(&env.conn, id, &question("third", None)).unwrap();

    let questions = get_questions(&env.conn, id).unwrap();
    let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(questions[2].order, 3);
    assert_eq!(get_assessment(&env.conn, id).unwrap().unwrap().total_questions, 3);

    assert!(delete_question(&env.conn, third).unwrap());
    assert_eq!(get_assessment(&env.conn, id).unwrap().unwrap().total_questions, 2);
    assert!(!delete_question(&env.conn, third).unwrap());
  }

  #[test]
  fn test_question_order_taken() {
    let env = TestEnv::new().unwrap();
    let id = create_assessment(&env.conn, &draft("A")).unwrap();
    let q = add_question(&env.conn, id, &question("one", Some(1))).unwrap();

    assert!(question_order_taken(&env.conn, id, 1, None).unwrap());
    assert!(!question_order_taken(&env.conn, id, 1, Some(q)).unwrap());
    assert!(!question_order_taken(&env.conn, id, 2, None).unwrap());
  }

  #[test]
  fn test_delete_cascades_questions() {
    let env = TestEnv::new().unwrap();
    let id = create_assessment(&env.conn, &draft("A")).unwrap();
    add_question(&env.conn, id, &question("one", None)).unwrap();

    assert_eq!(count_attempts_for_assessment(&env.conn, id).unwrap(), 0);
    assert!(delete_assessment(&env.conn, id).unwrap());
    assert!(get_questions(&env.conn, id).unwrap().is_empty());
    assert!(!delete_assessment(&env.conn, id).unwrap());
  }
}
