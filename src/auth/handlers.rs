//! Authentication handlers for register, login, logout and the current user.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::{AuthContext, SESSION_COOKIE_NAME};
use super::password;
use crate::config::MIN_PASSWORD_LEN;
use crate::db::{try_lock, LogOnError};
use crate::domain::{Profile, Role};
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::session::generate_session_id;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn session_cookie(session_id: String, hours: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(hours))
        .build()
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Open a session for `user_id` and return the jar carrying its cookie
fn start_session(state: &AppState, jar: CookieJar, user_id: i64) -> AppResult<CookieJar> {
    let session_id = generate_session_id();
    {
        let conn = try_lock(&state.db)?;
        auth_db::create_session(&conn, user_id, &session_id, state.config.session_hours)?;
    }
    Ok(jar.add(session_cookie(session_id, state.config.session_hours)))
}

/// POST /api/auth/register - Create a Free account and sign in
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(form): ApiJson<RegisterForm>,
) -> AppResult<impl IntoResponse> {
    let email = form.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Please enter a valid email address".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let role = if state.config.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };
    let hash = password::hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    let first_name = clean_name(form.first_name);
    let last_name = clean_name(form.last_name);

    let profile = {
        let conn = try_lock(&state.db)?;
        if auth_db::email_exists(&conn, &email)? {
            return Err(AppError::Conflict("An account with this email already exists".to_string()));
        }
        let user_id = auth_db::create_profile(
            &conn,
            &auth_db::NewProfile {
                email: &email,
                password_hash: &hash,
                first_name: first_name.as_deref(),
                last_name: last_name.as_deref(),
                role,
            },
        )?;
        auth_db::get_profile(&conn, user_id)?.ok_or_else(|| AppError::not_found("Profile"))?
    };

    tracing::info!("Registered user {} ({})", profile.id, profile.role.as_str());
    let jar = start_session(&state, jar, profile.id)?;
    Ok((StatusCode::CREATED, jar, Json(profile)))
}

/// POST /api/auth/login - Verify credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(form): ApiJson<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let (user_id, stored_hash) = {
        let conn = try_lock(&state.db)?;
        auth_db::get_credentials(&conn, &email)?.ok_or_else(invalid)?
    };

    if !password::verify_password(&form.password, &stored_hash) {
        tracing::info!("Failed login for user {}", user_id);
        return Err(invalid());
    }

    let profile = {
        let conn = try_lock(&state.db)?;
        // Update last login time (log but don't fail on error)
        auth_db::update_last_login(&conn, user_id).log_warn("Failed to update last login");
        auth_db::get_profile(&conn, user_id)?.ok_or_else(invalid)?
    };

    let jar = start_session(&state, jar, user_id)?;
    Ok((jar, Json(profile)))
}

/// POST /api/auth/logout - Delete the session and clear the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        if let Ok(conn) = try_lock(&state.db) {
            auth_db::delete_session(&conn, cookie.value())
                .log_warn("Failed to delete session during logout");
        }
    }

    let removal = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.remove(removal), StatusCode::NO_CONTENT)
}

/// GET /api/me - Current user's profile
pub async fn me(auth: AuthContext) -> Json<Profile> {
    Json(auth.profile)
}

/// Basic shape check: one `@`, non-empty local part, dotted domain, no spaces
fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(is_valid_email("a+tag@x.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("")); // empty
        assert!(!is_valid_email("ana.example.com")); // no @
        assert!(!is_valid_email("@example.com")); // no local part
        assert!(!is_valid_email("ana@localhost")); // no dot
        assert!(!is_valid_email("ana@example..com")); // empty label
        assert!(!is_valid_email("ana@@example.com")); // double @
        assert!(!is_valid_email("ana @example.com")); // space
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name(Some("  Ana ".into())), Some("Ana".to_string()));
        assert_eq!(clean_name(Some("   ".into())), None);
        assert_eq!(clean_name(None), None);
    }
}
