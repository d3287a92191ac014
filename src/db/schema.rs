//! Schema creation with version-gated migrations.
//!
//! Each migration checks the recorded version, runs its SQL, and records the
//! new version in `db_version`, so it runs exactly once per database.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Increment when adding a migration
pub const SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS db_version (
      version INTEGER PRIMARY KEY,
      applied_at TEXT NOT NULL,
      description TEXT
    );
    "#,
  )?;

  let current_version = get_schema_version(conn)?;
  tracing::debug!("schema version: {}", current_version);

  if current_version < 1 {
    migrate_v0_to_v1(conn)?;
  }

  Ok(())
}

/// v0→v1: profiles, sessions, assessments, questions, score ranges, attempts
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v0→v1: Create base tables");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL UNIQUE COLLATE NOCASE,
      password_hash TEXT NOT NULL,
      first_name TEXT,
      last_name TEXT,
      user_tier TEXT NOT NULL DEFAULT 'Free',
      role TEXT NOT NULL DEFAULT 'user',
      created_at TEXT NOT NULL,
      last_login_at TEXT
    );

    CREATE TABLE IF NOT EXISTS sessions (
      id TEXT PRIMARY KEY,
      user_id INTEGER NOT NULL,
      created_at TEXT NOT NULL,
      expires_at TEXT NOT NULL,
      last_access_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS form_assessments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      description TEXT NOT NULL DEFAULT '',
      total_questions INTEGER NOT NULL DEFAULT 0,
      is_active INTEGER NOT NULL DEFAULT 1,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS assessment_questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      assessment_id INTEGER NOT NULL,
      question_text TEXT NOT NULL,
      question_order INTEGER NOT NULL,
      UNIQUE (assessment_id, question_order),
      FOREIGN KEY (assessment_id) REFERENCES form_assessments(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS assessment_score_ranges (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      assessment_id INTEGER NOT NULL,
      min_score INTEGER NOT NULL,
      max_score INTEGER NOT NULL,
      status TEXT NOT NULL,
      interpretation TEXT NOT NULL,
      FOREIGN KEY (assessment_id) REFERENCES form_assessments(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS user_assessments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      assessment_id INTEGER NOT NULL,
      total_score INTEGER NOT NULL,
      max_possible_score INTEGER NOT NULL,
      percentage_score REAL NOT NULL,
      responses TEXT NOT NULL,
      completed_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE,
      FOREIGN KEY (assessment_id) REFERENCES form_assessments(id)
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
    CREATE INDEX IF NOT EXISTS idx_questions_assessment ON assessment_questions(assessment_id);
    CREATE INDEX IF NOT EXISTS idx_score_ranges_assessment ON assessment_score_ranges(assessment_id);
    CREATE INDEX IF NOT EXISTS idx_user_assessments_user ON user_assessments(user_id);
    CREATE INDEX IF NOT EXISTS idx_user_assessments_completed ON user_assessments(completed_at);
    "#,
  )?;
  record_version(&tx, 1, "Create base tables")?;
  tx.commit()
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
    params![version, now, description],
  )?;
  tracing::info!("Recorded schema version {} - {}", version, description);
  Ok(())
}

/// Current schema version (0 if none recorded)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
  conn.query_row(
    "SELECT COALESCE(MAX(version), 0) FROM db_version",
    [],
    |row| row.get(0),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

    let versions: i64 = conn
      .query_row("SELECT COUNT(*) FROM db_version", [], |row| row.get(0))
      .unwrap();
    assert_eq!(versions, 1);
  }

  #[test]
  fn test_foreign_keys_enabled() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let enabled: i64 = conn
      .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
      .unwrap();
    assert_eq!(enabled, 1);
  }
}
