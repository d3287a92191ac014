//! Admin dashboard aggregates

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::{params, Connection, Result};
use serde::Serialize;

use super::attempts::{recent_attempts, AttemptListing};

/// Months covered by the activity chart, current month included
pub const MONTHS_OF_ACTIVITY: u32 = 12;

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyActivity {
  /// `YYYY-MM`
  pub month: String,
  pub new_users: i64,
  pub attempts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
  pub total_users: i64,
  /// Users on any tier other than Free
  pub paid_users: i64,
  pub total_attempts: i64,
  pub average_attempts_per_user: f64,
  pub recent_attempts: Vec<AttemptListing>,
  pub monthly: Vec<MonthlyActivity>,
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
  conn.query_row(sql, [], |row| row.get(0))
}

/// attempts / users rounded to two decimals, 0 with no users
pub fn average_per_user(attempts: i64, users: i64) -> f64 {
  if users == 0 {
    return 0.0;
  }
  let raw = attempts as f64 / users as f64;
  (raw * 100.0).round() / 100.0
}

/// `YYYY-MM` keys for the trailing `months` months ending at `today`, oldest first
pub fn month_keys(today: NaiveDate, months: u32) -> Vec<String> {
  let current = today.year() * 12 + today.month0() as i32;
  (0..months as i32)
    .rev()
    .map(|back| {
      let index = current - back;
      format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
    })
    .collect()
}

fn counts_by_month(conn: &Connection, sql: &str, since: &str) -> Result<HashMap<String, i64>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt.query_map(params![since], |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
  })?;
  rows.collect()
}

pub fn monthly_activity(conn: &Connection, today: NaiveDate) -> Result<Vec<MonthlyActivity>> {
  let keys = month_keys(today, MONTHS_OF_ACTIVITY);
  let Some(first) = keys.first() else {
    return Ok(Vec::new());
  };

  let users = counts_by_month(
    conn,
    r#"SELECT substr(created_at, 1, 7) AS month, COUNT(*)
       FROM profiles WHERE substr(created_at, 1, 7) >= ?1 GROUP BY month"#,
    first,
  )?;
  let attempts = counts_by_month(
    conn,
    r#"SELECT substr(completed_at, 1, 7) AS month, COUNT(*)
       FROM user_assessments WHERE substr(completed_at, 1, 7) >= ?1 GROUP BY month"#,
    first,
  )?;

  Ok(
    keys
      .into_iter()
      .map(|month| MonthlyActivity {
        new_users: users.get(&month).copied().unwrap_or(0),
        attempts: attempts.get(&month).copied().unwrap_or(0),
        month,
      })
      .collect(),
  )
}

pub fn get_dashboard_stats(conn: &Connection, recent_limit: u32) -> Result<DashboardStats> {
  let total_users = count(conn, "SELECT COUNT(*) FROM profiles")?;
  let paid_users = count(conn, "SELECT COUNT(*) FROM profiles WHERE user_tier != 'Free'")?;
  let total_attempts = count(conn, "SELECT COUNT(*) FROM user_assessments")?;

  Ok(DashboardStats {
    total_users,
    paid_users,
    total_attempts,
    average_attempts_per_user: average_per_user(total_attempts, total_users),
    recent_attempts: recent_attempts(conn, recent_limit)?,
    monthly: monthly_activity(conn, Utc::now().date_naive())?,
  })
}
