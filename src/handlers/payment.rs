//! Mocked payment: gateway catalogue and tier upgrade.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::db as auth_db;
use crate::auth::AuthContext;
use crate::db::try_lock;
use crate::domain::{GatewayInfo, PaymentGateway, Profile, Tier};
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpgradeForm {
  pub gateway: PaymentGateway,
}

#[derive(Serialize)]
pub struct UpgradeResult {
  pub gateway: PaymentGateway,
  /// False when the caller was already Premium
  pub upgraded: bool,
  pub profile: Profile,
}

/// GET /api/payment/gateways
pub async fn list_gateways() -> Json<Vec<GatewayInfo>> {
  Json(PaymentGateway::ALL.iter().map(|g| g.info()).collect())
}

/// POST /api/payment/upgrade - No money moves; the caller becomes Premium
pub async fn upgrade(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiJson(form): ApiJson<UpgradeForm>,
) -> AppResult<Json<UpgradeResult>> {
  let conn = try_lock(&state.db)?;
  let upgraded = auth.profile.user_tier != Tier::Premium;
  if upgraded {
    auth_db::set_user_tier(&conn, auth.user_id(), Tier::Premium)?;
    tracing::info!(
      "User {} upgraded to Premium via {}",
      auth.user_id(),
      form.gateway.info().name
    );
  }

  let profile =
    auth_db::get_profile(&conn, auth.user_id())?.ok_or_else(|| AppError::not_found("Profile"))?;
  Ok(Json(UpgradeResult {
    gateway: form.gateway,
    upgraded,
    profile,
  }))
}
