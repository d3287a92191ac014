//! Admin dashboard and completed-attempts listing.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::AdminContext;
use crate::config::{ATTEMPTS_PAGE_SIZE, RECENT_ATTEMPTS_LIMIT};
use crate::db::{self, try_lock, AttemptPage, DashboardStats};
use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PageQuery {
  #[serde(default = "first_page")]
  pub page: u32,
}

fn first_page() -> u32 {
  1
}

/// GET /api/admin/dashboard
pub async fn dashboard(
  State(state): State<AppState>,
  _admin: AdminContext,
) -> AppResult<Json<DashboardStats>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::get_dashboard_stats(&conn, RECENT_ATTEMPTS_LIMIT)?))
}

/// GET /api/admin/attempts?page=N
pub async fn list_attempts(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<AttemptPage>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_all_attempts(&conn, query.page, ATTEMPTS_PAGE_SIZE)?))
}
