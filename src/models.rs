use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Trainer {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTrainer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbTrainer> for Trainer {
    fn from(trainer: DbTrainer) -> Self {
        Self {
            id: trainer.id.unwrap_or_default(),
            name: trainer.name.unwrap_or_default(),
            password_hash: trainer.password_hash.unwrap_or_default(),
            created_at: trainer
                .created_at
                .unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub date: Option<String>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbProject {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub date: Option<String>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub remarks: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    // Only populated by the owner-resolving query
    #[sqlx(default)]
    pub owner_name: Option<String>,
}

impl From<DbProject> for Project {
    fn from(db: DbProject) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            owner_id: db.owner_id.unwrap_or_default(),
            date: db.date,
            name: db.name,
            details: db.details,
            remarks: db.remarks,
            created_at: db.created_at.unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

/// A project joined with the current name of its owner, `None` when the
/// owner no longer exists.
#[derive(Debug, Clone)]
pub struct OwnedProject {
    pub owner_name: Option<String>,
    pub project: Project,
}

impl From<DbProject> for OwnedProject {
    fn from(mut db: DbProject) -> Self {
        let owner_name = db.owner_name.take();
        Self {
            owner_name,
            project: Project::from(db),
        }
    }
}

/// The four client-editable project fields. Updates overwrite all of them,
/// so a missing field is stored as null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFields {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_details: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainerUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}
