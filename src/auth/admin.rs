use std::fmt;

use tracing::warn;

use crate::config::AppConfig;
use crate::error::AppError;

use super::{hash_password, verify_password};

/// The single administrator login. It lives in configuration, not in the
/// trainer table; rotating it means changing the configured hash.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        if let Some(hash) = &config.admin_password_hash {
            return Ok(Self::new(&config.admin_username, hash));
        }

        match &config.admin_password {
            Some(password) if !password.is_empty() => {
                warn!("admin_password is set in plaintext; prefer admin_password_hash");
                Ok(Self::new(&config.admin_username, hash_password(password)?))
            }
            _ => Err(AppError::Internal(
                "Neither admin_password_hash nor admin_password is configured".to_string(),
            )),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Hash check runs even on a username mismatch
        let password_ok = verify_password(password, &self.password_hash);
        username == self.username && password_ok
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            admin_username: "root".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_verify() {
        let creds = AdminCredentials::new("root", hash_password("s3cret").unwrap());
        assert!(creds.verify("root", "s3cret"));
        assert!(!creds.verify("root", "wrong"));
        assert!(!creds.verify("admin", "s3cret"));
    }

    #[test]
    fn test_from_config_prefers_hash() {
        let hash = hash_password("from-hash").unwrap();
        let config = AppConfig {
            admin_password_hash: Some(hash),
            admin_password: Some("from-plain".to_string()),
            ..config()
        };

        let creds = AdminCredentials::from_config(&config).unwrap();
        assert!(creds.verify("root", "from-hash"));
        assert!(!creds.verify("root", "from-plain"));
    }

    #[test]
    fn test_from_config_hashes_plaintext() {
        let config = AppConfig {
            admin_password: Some("plain".to_string()),
            ..config()
        };

        let creds = AdminCredentials::from_config(&config).unwrap();
        assert_eq!(creds.username(), "root");
        assert!(creds.verify("root", "plain"));
    }

    #[test]
    fn test_from_config_requires_a_password() {
        assert!(AdminCredentials::from_config(&config()).is_err());

        let config = AppConfig {
            admin_password: Some(String::new()),
            ..config()
        };
        assert!(AdminCredentials::from_config(&config).is_err());
    }

    #[test]
    fn test_debug_hides_hash() {
        let creds = AdminCredentials::new("root", "$2b$04$abcdef");
        assert!(!format!("{:?}", creds).contains("abcdef"));
    }
}
