//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== Config File ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    admin: Option<AdminSection>,
    session: Option<SessionSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    bind_addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminSection {
    emails: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionSection {
    hours: Option<i64>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// Emails that receive the admin role at registration (lowercased)
    pub admin_emails: Vec<String>,
    pub session_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(paths::db_path()),
            bind_addr: format!("{}:{}", SERVER_ADDR, SERVER_PORT),
            admin_emails: Vec::new(),
            session_hours: SESSION_DURATION_HOURS,
        }
    }
}

impl AppConfig {
    /// Load .env, then config.toml from the working directory
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string("config.toml")
            .ok()
            .and_then(|contents| match toml::from_str::<ConfigFile>(&contents) {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!("Ignoring invalid config.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let database_path = file
            .database
            .and_then(|db| db.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        tracing::info!("Using database: {}", database_path.display());

        let server = file.server.unwrap_or_default();
        let port = server
            .port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);
        let bind_addr = server
            .bind_addr
            .or_else(|| env("BIND_ADDR"))
            .unwrap_or_else(|| format!("{}:{}", SERVER_ADDR, port));

        let admin_emails = file
            .admin
            .and_then(|admin| admin.emails)
            .or_else(|| {
                env("ADMIN_EMAILS").map(|list| list.split(',').map(str::to_string).collect())
            })
            .unwrap_or_default()
            .into_iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();

        let session_hours = file
            .session
            .and_then(|s| s.hours)
            .or_else(|| env("SESSION_HOURS").and_then(|h| h.parse().ok()))
            .filter(|h| *h > 0)
            .map(|h| h.min(MAX_SESSION_HOURS))
            .unwrap_or(defaults.session_hours);

        Self {
            database_path,
            bind_addr,
            admin_emails,
            session_hours,
        }
    }

    /// Whether an email is configured to be an admin
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Session lifetime in hours (one week)
pub const SESSION_DURATION_HOURS: i64 = 24 * 7;

/// Upper bound for a configured session lifetime (one year)
pub const MAX_SESSION_HOURS: i64 = 24 * 365;

// ==================== Auth Rules ====================

/// Minimum password length at registration and login
pub const MIN_PASSWORD_LEN: usize = 6;

// ==================== Query Limits ====================

/// Attempts per page in the admin listing
pub const ATTEMPTS_PAGE_SIZE: u32 = 10;

/// Recent attempts shown on the admin dashboard
pub const RECENT_ATTEMPTS_LIMIT: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve_with(file: &str, env: &[(&str, &str)]) -> AppConfig {
        let file: ConfigFile = toml::from_str(file).unwrap();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(file, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = resolve_with("", &[]);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.session_hours, SESSION_DURATION_HOURS);
        assert!(config.admin_emails.is_empty());
        assert!(config.database_path.ends_with("assessments.db"));
    }

    #[test]
    fn test_env_overrides_default() {
        let config = resolve_with(
            "",
            &[
                ("DATABASE_PATH", "/tmp/x.db"),
                ("PORT", "8080"),
                ("ADMIN_EMAILS", "Boss@Example.com, ops@example.com,"),
            ],
        );
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.admin_emails, vec!["boss@example.com", "ops@example.com"]);
        assert!(config.is_admin_email(" BOSS@example.com"));
        assert!(!config.is_admin_email("user@example.com"));
    }

    #[test]
    fn test_config_file_overrides_env() {
        let config = resolve_with(
            r#"
            [database]
            path = "from-file.db"

            [server]
            bind_addr = "127.0.0.1:9000"

            [admin]
            emails = ["file@example.com"]

            [session]
            hours = 2
            "#,
            &[
                ("DATABASE_PATH", "from-env.db"),
                ("BIND_ADDR", "0.0.0.0:1"),
                ("ADMIN_EMAILS", "env@example.com"),
            ],
        );
        assert_eq!(config.database_path, PathBuf::from("from-file.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.admin_emails, vec!["file@example.com"]);
        assert_eq!(config.session_hours, 2);
    }

    #[test]
    fn test_non_positive_session_hours_fall_back() {
        let config = resolve_with("[session]\nhours = 0", &[]);
        assert_eq!(config.session_hours, SESSION_DURATION_HOURS);
    }

    #[test]
    fn test_huge_session_hours_are_capped() {
        let config = resolve_with("", &[("SESSION_HOURS", "9223372036854775807")]);
        assert_eq!(config.session_hours, MAX_SESSION_HOURS);
        let config = resolve_with("[session]\nhours = 100000000", &[]);
        assert_eq!(config.session_hours, MAX_SESSION_HOURS);
        let _ = chrono::Duration::hours(config.session_hours);
        let _ = time::Duration::hours(config.session_hours);
    }
}
