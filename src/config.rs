use std::path::PathBuf;

use chrono::Duration;
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

/// Application settings, read from the same figment Rocket uses
/// (`Rocket.toml` plus `ROCKET_*` environment variables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<String>,
    pub session_ttl_hours: i64,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://project_tracker.db?mode=rwc".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            admin_password: None,
            session_ttl_hours: 24,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        figment.extract()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_overrides() {
        temp_env::with_vars_unset(
            [
                "ROCKET_DATABASE_URL",
                "ROCKET_ADMIN_USERNAME",
                "ROCKET_ADMIN_PASSWORD",
                "ROCKET_ADMIN_PASSWORD_HASH",
                "ROCKET_SESSION_TTL_HOURS",
            ],
            || {
                let config = AppConfig::from_figment(&rocket::Config::figment()).unwrap();
                assert_eq!(config.admin_username, "admin");
                assert_eq!(config.session_ttl_hours, 24);
                assert!(config.admin_password_hash.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("ROCKET_ADMIN_USERNAME", Some("root")),
                ("ROCKET_ADMIN_PASSWORD", Some("hunter2")),
                ("ROCKET_SESSION_TTL_HOURS", Some("2")),
                ("ROCKET_DATABASE_URL", Some("sqlite::memory:")),
            ],
            || {
                let config = AppConfig::from_figment(&rocket::Config::figment()).unwrap();
                assert_eq!(config.admin_username, "root");
                assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
                assert_eq!(config.database_url, "sqlite::memory:");
                assert_eq!(config.session_ttl(), Duration::hours(2));
            },
        );
    }

    #[test]
    fn test_ttl_is_at_least_an_hour() {
        let config = AppConfig {
            session_ttl_hours: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(1));
    }
}
