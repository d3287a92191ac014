pub mod admin;
pub mod assessments;
pub mod attempts;
pub mod payment;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

pub use assessments::{get_assessment, list_assessments, submit_attempt};
pub use attempts::{get_attempt_result, my_attempts, AttemptResult};
pub use payment::{list_gateways, upgrade};

#[derive(Serialize)]
pub struct Health {
  pub status: &'static str,
  pub version: &'static str,
}

pub async fn health() -> Json<Health> {
  Json(Health {
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
  })
}

/// Full application router with request tracing
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/auth/register", post(auth::register))
    .route("/api/auth/login", post(auth::login))
    .route("/api/auth/logout", post(auth::logout))
    .route("/api/me", get(auth::me))
    .route("/api/me/attempts", get(my_attempts))
    .route("/api/assessments", get(list_assessments))
    .route("/api/assessments/{id}", get(get_assessment))
    .route("/api/assessments/{id}/attempts", post(submit_attempt))
    .route("/api/attempts/{id}", get(get_attempt_result))
    .route("/api/payment/gateways", get(list_gateways))
    .route("/api/payment/upgrade", post(upgrade))
    .nest("/api/admin", admin::routes())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
