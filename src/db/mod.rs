pub mod assessments;
pub mod attempts;
pub mod schema;
pub mod score_ranges;
pub mod stats;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{default_icp_assessment, QuestionDraft};

// Re-export all public items from submodules
pub use assessments::*;
pub use attempts::*;
pub use schema::run_migrations;
pub use score_ranges::*;
pub use stats::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).log_warn("Could not create database directory");
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Seed the ICP assessment with its questions and ranges when no assessment
/// exists yet. Returns the new assessment ID if one was created.
pub fn seed_default_assessment(conn: &Connection) -> Result<Option<i64>> {
  let count: i64 = conn.query_row("SELECT COUNT(*) FROM form_assessments", [], |row| row.get(0))?;
  if count > 0 {
    return Ok(None);
  }

  let seed = default_icp_assessment();
  let id = create_assessment(conn, &seed.draft)?;
  for (i, text) in seed.questions.iter().enumerate() {
    let draft = QuestionDraft {
      text: text.to_string(),
      order: Some(i as u32 + 1),
    };
    add_question(conn, id, &draft)?;
  }
  for range in &seed.ranges {
    create_score_range(conn, id, range)?;
  }

  tracing::info!(
    "Seeded default assessment '{}' with {} questions",
    seed.draft.title,
    seed.questions.len()
  );
  Ok(Some(id))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::interpret;
  use crate::domain::scoring::max_possible_score;
  use crate::testing::TestEnv;

  #[test]
  fn test_seed_runs_once() {
    let env = TestEnv::new().unwrap();
    let id = seed_default_assessment(&env.conn).unwrap().unwrap();
    assert!(seed_default_assessment(&env.conn).unwrap().is_none());

    let assessment = get_assessment(&env.conn, id).unwrap().unwrap();
    assert_eq!(assessment.total_questions, 10);
    assert!(assessment.is_active);
    assert_eq!(max_possible_score(get_questions(&env.conn, id).unwrap().len()), 20);

    let ranges = get_score_ranges(&env.conn, id).unwrap();
    assert_eq!(ranges.len(), 4);
    assert_eq!(interpret(20, &ranges).unwrap().status, "Ready to Grow");
    assert_eq!(interpret(-10, &ranges).unwrap().status, "Needs Clarity");
  }

  #[test]
  fn test_log_warn_default_swallows_error() {
    let failed: std::result::Result<i64, DbLockError> = Err(DbLockError);
    assert_eq!(failed.log_warn_default("lock"), 0);
    let ok: std::result::Result<i64, DbLockError> = Ok(3);
    assert_eq!(ok.log_warn("lock"), Some(3));
  }

  #[test]
  fn test_try_lock() {
    let pool: DbPool = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
    assert!(try_lock(&pool).is_ok());
  }
}
