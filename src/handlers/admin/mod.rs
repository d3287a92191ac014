//! Admin-only API. Every handler takes an `AdminContext`.

mod assessments;
mod dashboard;
mod score_ranges;
mod users;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Routes mounted under /api/admin
pub fn routes() -> Router<AppState> {
  Router::new()
    .route("/dashboard", get(dashboard::dashboard))
    .route("/attempts", get(dashboard::list_attempts))
    .route("/assessments", get(assessments::list).post(assessments::create))
    .route(
      "/assessments/{id}",
      get(assessments::get)
        .put(assessments::update)
        .delete(assessments::delete),
    )
    .route("/assessments/{id}/toggle", post(assessments::toggle))
    .route("/assessments/{id}/questions", post(assessments::add_question))
    .route(
      "/questions/{id}",
      put(assessments::update_question).delete(assessments::delete_question),
    )
    .route(
      "/assessments/{id}/ranges",
      get(score_ranges::list).post(score_ranges::create),
    )
    .route(
      "/ranges/{id}",
      put(score_ranges::update).delete(score_ranges::delete),
    )
    .route("/users", get(users::list))
    .route("/users/{id}/tier", put(users::set_tier))
    .route("/users/{id}/role", put(users::set_role))
}
