//! Admin user management: listing, tiers and roles.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::db::{self as auth_db, UserFilter, UserListing};
use crate::auth::AdminContext;
use crate::db::try_lock;
use crate::domain::{Profile, Role, Tier};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserQuery {
  #[serde(default)]
  pub search: Option<String>,
  /// "Free", "Premium", or "all"/empty for no filter
  #[serde(default)]
  pub tier: Option<String>,
}

#[derive(Deserialize)]
pub struct SetTierForm {
  pub tier: Tier,
}

#[derive(Deserialize)]
pub struct SetRoleForm {
  pub role: Role,
}

fn parse_tier_filter(raw: Option<&str>) -> AppResult<Option<Tier>> {
  match raw.map(str::trim) {
    None | Some("") | Some("all") => Ok(None),
    Some(value) => Tier::from_str(value)
      .map(Some)
      .ok_or_else(|| AppError::BadRequest(format!("Unknown tier '{}'", value))),
  }
}

/// GET /api/admin/users?search=&tier=
pub async fn list(
  State(state): State<AppState>,
  _admin: AdminContext,
  ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<Vec<UserListing>>> {
  let filter = UserFilter {
    tier: parse_tier_filter(query.tier.as_deref())?,
    search: query.search,
  };
  let conn = try_lock(&state.db)?;
  Ok(Json(auth_db::list_users(&conn, &filter)?))
}

/// PUT /api/admin/users/{id}/tier
pub async fn set_tier(
  State(state): State<AppState>,
  admin: AdminContext,
  ApiPath(user_id): ApiPath<i64>,
  ApiJson(form): ApiJson<SetTierForm>,
) -> AppResult<Json<Profile>> {
  let conn = try_lock(&state.db)?;
  if !auth_db::set_user_tier(&conn, user_id, form.tier)? {
    return Err(AppError::not_found("User"));
  }
  tracing::info!(
    "Admin {} set user {} tier to {}",
    admin.user_id(),
    user_id,
    form.tier.as_str()
  );
  let profile = auth_db::get_profile(&conn, user_id)?.ok_or_else(|| AppError::not_found("User"))?;
  Ok(Json(profile))
}

/// PUT /api/admin/users/{id}/role - Admins cannot demote themselves
pub async fn set_role(
  State(state): State<AppState>,
  admin: AdminContext,
  ApiPath(user_id): ApiPath<i64>,
  ApiJson(form): ApiJson<SetRoleForm>,
) -> AppResult<Json<Profile>> {
  if user_id == admin.user_id() && form.role != Role::Admin {
    return Err(AppError::BadRequest("You cannot remove your own admin role".to_string()));
  }

  let conn = try_lock(&state.db)?;
  if !auth_db::set_user_role(&conn, user_id, form.role)? {
    return Err(AppError::not_found("User"));
  }
  tracing::info!(
    "Admin {} set user {} role to {}",
    admin.user_id(),
    user_id,
    form.role.as_str()
  );
  let profile = auth_db::get_profile(&conn, user_id)?.ok_or_else(|| AppError::not_found("User"))?;
  Ok(Json(profile))
}
