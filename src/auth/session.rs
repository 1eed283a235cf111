use anyhow::Error;
use chrono::{NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use std::fmt;

use crate::error::AppError;

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionRole {
    Administrator,
    Trainer,
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRole::Administrator => "admin",
            SessionRole::Trainer => "trainer",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "admin" => Ok(SessionRole::Administrator),
            "trainer" => Ok(SessionRole::Trainer),
            _ => Err(Error::msg(format!("Unknown session role: {}", s))),
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerIdentity {
    pub id: String,
    pub name: String,
}

/// Who the caller is. Passed into every directory and ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Administrator,
    Trainer(TrainerIdentity),
}

impl Session {
    pub fn trainer(id: impl Into<String>, name: impl Into<String>) -> Self {
        Session::Trainer(TrainerIdentity {
            id: id.into(),
            name: name.into(),
        })
    }

    pub fn role(&self) -> Option<SessionRole> {
        match self {
            Session::Anonymous => None,
            Session::Administrator => Some(SessionRole::Administrator),
            Session::Trainer(_) => Some(SessionRole::Trainer),
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self {
            Session::Administrator => Ok(()),
            _ => {
                tracing::warn!(role = ?self.role(), "Administrator session required");
                Err(AppError::Unauthorized)
            }
        }
    }

    pub fn require_trainer(&self) -> Result<&TrainerIdentity, AppError> {
        match self {
            Session::Trainer(identity) => Ok(identity),
            _ => {
                tracing::warn!(role = ?self.role(), "Trainer session required");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Server-side session row, keyed by the token carried in the cookie.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub token: String,
    pub session: Session,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUserSession {
    pub token: Option<String>,
    pub role: Option<String>,
    pub trainer_id: Option<String>,
    pub trainer_name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl TryFrom<DbUserSession> for SessionRecord {
    type Error = AppError;

    fn try_from(db: DbUserSession) -> Result<Self, Self::Error> {
        let role = SessionRole::from_str(db.role.as_deref().unwrap_or_default())
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let session = match role {
            SessionRole::Administrator => Session::Administrator,
            SessionRole::Trainer => match db.trainer_id {
                Some(id) => Session::trainer(id, db.trainer_name.unwrap_or_default()),
                None => {
                    return Err(AppError::Internal(
                        "Trainer session stored without a trainer id".to_string(),
                    ));
                }
            },
        };

        let now = Utc::now().naive_utc();
        Ok(Self {
            token: db.token.unwrap_or_default(),
            session,
            created_at: db.created_at.unwrap_or(now),
            expires_at: db.expires_at.unwrap_or(now),
        })
    }
}

impl SessionRecord {
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }
}

pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
