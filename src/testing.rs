//! Test utilities for database setup.
//!
//! Reuses the real migrations so tests never duplicate schema SQL.

use rusqlite::Connection;
use tempfile::TempDir;

/// Migrated database in a temporary directory, removed on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    /// Create a fresh database with all migrations applied and no seed data.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("assessments.db");
        let conn = Connection::open(&db_path)?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_database_file() {
        let env = TestEnv::new().unwrap();
        assert!(env.temp.path().join("assessments.db").exists());

        let count: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM form_assessments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
