//! Authentication extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::db::try_lock;
use crate::domain::Profile;
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "icp_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Rejects with 401 if there is no valid session.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub profile: Profile,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.profile.id
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || AppError::Unauthorized("Please sign in".to_string());

        // CookieJar extraction is infallible
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| unauthorized())?;

        let session_id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or_else(unauthorized)?;

        let conn = try_lock(&state.db)?;
        let profile = auth_db::get_session_profile(&conn, &session_id)?.ok_or_else(unauthorized)?;

        Ok(AuthContext { profile })
    }
}

/// Admin-only request context.
/// Rejects with 401 when signed out and 403 when the user is not an admin.
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

impl AdminContext {
    pub fn user_id(&self) -> i64 {
        self.0.user_id()
    }
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if !auth.profile.is_admin() {
            tracing::warn!("Non-admin user {} denied admin access", auth.user_id());
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminContext(auth))
    }
}

/// Optional authentication extractor.
/// Returns Some(AuthContext) if authenticated, None otherwise.
/// Use for routes that work both with and without authentication.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthContext::from_request_parts(parts, state).await {
            Ok(auth) => Ok(OptionalAuth(Some(auth))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
