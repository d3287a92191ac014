//! Profile and session operations (profiles, sessions tables).

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{Profile, Role, Tier};

const PROFILE_COLUMNS: &str =
    "id, email, first_name, last_name, user_tier, role, created_at";

fn profile_from_row(row: &Row<'_>) -> Result<Profile> {
    let tier: String = row.get(4)?;
    let role: String = row.get(5)?;
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        user_tier: Tier::from_str(&tier).unwrap_or_default(),
        role: Role::from_str(&role).unwrap_or_default(),
        created_at: row.get(6)?,
    })
}

/// Fields for a new account
pub struct NewProfile<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: Role,
}

/// Create a new profile (always Free), returns the user ID
pub fn create_profile(conn: &Connection, new: &NewProfile<'_>) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"INSERT INTO profiles (email, password_hash, first_name, last_name, user_tier, role, created_at)
           VALUES (?1, ?2, ?3, ?4, 'Free', ?5, ?6)"#,
        params![
            new.email,
            new.password_hash,
            new.first_name,
            new.last_name,
            new.role.as_str(),
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Check if an email is already registered (case-insensitive)
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM profiles WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get credentials by email, returns (user_id, password_hash)
pub fn get_credentials(conn: &Connection, email: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM profiles WHERE email = ?1",
        params![email],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn get_profile(conn: &Connection, user_id: i64) -> Result<Option<Profile>> {
    conn.query_row(
        &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
        params![user_id],
        profile_from_row,
    )
    .optional()
}

pub fn set_user_tier(conn: &Connection, user_id: i64, tier: Tier) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE profiles SET user_tier = ?1 WHERE id = ?2",
        params![tier.as_str(), user_id],
    )?;
    Ok(changed > 0)
}

pub fn set_user_role(conn: &Connection, user_id: i64, role: Role) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE profiles SET role = ?1 WHERE id = ?2",
        params![role.as_str(), user_id],
    )?;
    Ok(changed > 0)
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE profiles SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

/// Profile row for the admin user list
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserListing {
    #[serde(flatten)]
    pub profile: Profile,
    pub assessment_count: i64,
}

/// Filters for the admin user list
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    /// Matches email, first or last name (case-insensitive substring)
    pub search: Option<String>,
    pub tier: Option<Tier>,
}

/// Treat `%`, `_` and `\` in user input as literals inside a LIKE pattern
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// All users matching `filter`, newest first, with attempt counts
pub fn list_users(conn: &Connection, filter: &UserFilter) -> Result<Vec<UserListing>> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(&s.to_lowercase())));

    let mut stmt = conn.prepare(
        r#"SELECT p.id, p.email, p.first_name, p.last_name, p.user_tier, p.role, p.created_at,
                  (SELECT COUNT(*) FROM user_assessments ua WHERE ua.user_id = p.id)
           FROM profiles p
           WHERE (?1 IS NULL
                  OR LOWER(p.email) LIKE ?1 ESCAPE '\'
                  OR LOWER(COALESCE(p.first_name, '')) LIKE ?1 ESCAPE '\'
                  OR LOWER(COALESCE(p.last_name, '')) LIKE ?1 ESCAPE '\')
             AND (?2 IS NULL OR p.user_tier = ?2)
           ORDER BY p.created_at DESC, p.id DESC"#,
    )?;
    let rows = stmt.query_map(
        params![search, filter.tier.map(|t| t.as_str())],
        |row| {
            Ok(UserListing {
                profile: profile_from_row(row)?,
                assessment_count: row.get(7)?,
            })
        },
    )?;
    rows.collect()
}

// ==================== Sessions ====================

/// Create a new session
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Validate session and return the signed-in user's profile
pub fn get_session_profile(conn: &Connection, session_id: &str) -> Result<Option<Profile>> {
    let now = Utc::now().to_rfc3339();
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE id = ?1 AND expires_at > ?2",
            params![session_id, now],
            |row| row.get(0),
        )
        .optional()?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    if let Err(e) = conn.execute(
        "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
        params![now, session_id],
    ) {
        tracing::warn!("Failed to touch session: {}", e);
    }

    get_profile(conn, user_id)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    fn new_user(conn: &Connection, email: &str, first: Option<&str>) -> i64 {
        create_profile(
            conn,
            &NewProfile {
                email,
                password_hash: "hash",
                first_name: first,
                last_name: None,
                role: Role::User,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let env = TestEnv::new().unwrap();
        let id = new_user(&env.conn, "Ana@Example.com", None);

        assert!(email_exists(&env.conn, "ana@example.com").unwrap());
        let (found, hash) = get_credentials(&env.conn, "ANA@EXAMPLE.COM").unwrap().unwrap();
        assert_eq!((found, hash.as_str()), (id, "hash"));
        assert!(get_credentials(&env.conn, "bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_new_profiles_are_free_users() {
        let env = TestEnv::new().unwrap();
        let id = new_user(&env.conn, "ana@example.com", None);
        let profile = get_profile(&env.conn, id).unwrap().unwrap();
        assert_eq!(profile.user_tier, Tier::Free);
        assert_eq!(profile.role, Role::User);

        assert!(set_user_tier(&env.conn, id, Tier::Premium).unwrap());
        assert!(set_user_role(&env.conn, id, Role::Admin).unwrap());
        let profile = get_profile(&env.conn, id).unwrap().unwrap();
        assert_eq!((profile.user_tier, profile.role), (Tier::Premium, Role::Admin));
        assert!(!set_user_tier(&env.conn, 999, Tier::Premium).unwrap());
    }

    #[test]
    fn test_list_users_search_and_tier_filter() {
        let env = TestEnv::new().unwrap();
        let ana = new_user(&env.conn, "ana@example.com", Some("Ana"));
        let _bob = new_user(&env.conn, "bob@corp.io", Some("Robert"));
        set_user_tier(&env.conn, ana, Tier::Premium).unwrap();

        let all = list_users(&env.conn, &UserFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let by_name = UserFilter {
            search: Some("rob".into()),
            tier: None,
        };
        let found = list_users(&env.conn, &by_name).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.email, "bob@corp.io");

        let premium = UserFilter {
            search: None,
            tier: Some(Tier::Premium),
        };
        let found = list_users(&env.conn, &premium).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.id, ana);
        assert_eq!(found[0].assessment_count, 0);
    }

    #[test]
    fn test_list_users_search_wildcards_are_literal() {
        let env = TestEnv::new().unwrap();
        new_user(&env.conn, "ana@example.com", None);
        new_user(&env.conn, "first_last@example.com", None);

        let search = |text: &str| {
            let filter = UserFilter {
                search: Some(text.into()),
                tier: None,
            };
            list_users(&env.conn, &filter).unwrap()
        };

        assert!(search("%").is_empty());
        let found = search("_");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.email, "first_last@example.com");
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }

    #[test]
    fn test_sessions_resolve_until_deleted() {
        let env = TestEnv::new().unwrap();
        let id = new_user(&env.conn, "ana@example.com", None);
        create_session(&env.conn, id, "abc", 1).unwrap();

        let profile = get_session_profile(&env.conn, "abc").unwrap().unwrap();
        assert_eq!(profile.id, id);
        assert!(get_session_profile(&env.conn, "nope").unwrap().is_none());

        delete_session(&env.conn, "abc").unwrap();
        assert!(get_session_profile(&env.conn, "abc").unwrap().is_none());
    }

    #[test]
    fn test_expired_sessions_are_ignored_and_cleaned() {
        let env = TestEnv::new().unwrap();
        let id = new_user(&env.conn, "ana@example.com", None);
        create_session(&env.conn, id, "old", -1).unwrap();

        assert!(get_session_profile(&env.conn, "old").unwrap().is_none());
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
    }
}
