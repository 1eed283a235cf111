use crate::{
    auth::{DbUserSession, SessionRecord, SessionRole},
    error::AppError,
    models::{DbProject, DbTrainer, OwnedProject, Project, ProjectFields, Trainer},
};
use chrono::{NaiveDateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[instrument(skip(pool, password_hash))]
pub async fn insert_trainer(
    pool: &Pool<Sqlite>,
    name: &str,
    password_hash: &str,
) -> Result<String, AppError> {
    info!("Inserting trainer");
    let id = new_id();
    let now = Utc::now().naive_utc();

    sqlx::query("INSERT INTO trainers (id, name, password_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(password_hash)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::AlreadyExists("Trainer already exists".to_string())
            } else {
                AppError::Database(err)
            }
        })?;

    Ok(id)
}

#[instrument(skip(pool))]
pub async fn find_trainer_by_name(
    pool: &Pool<Sqlite>,
    name: &str,
) -> Result<Option<Trainer>, AppError> {
    info!("Finding trainer by name");
    let row = sqlx::query_as::<_, DbTrainer>(
        "SELECT id, name, password_hash, created_at FROM trainers WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Trainer::from))
}

#[instrument(skip(pool))]
pub async fn get_all_trainers(pool: &Pool<Sqlite>) -> Result<Vec<Trainer>, AppError> {
    info!("Getting all trainers");
    let rows = sqlx::query_as::<_, DbTrainer>(
        "SELECT id, name, password_hash, created_at FROM trainers ORDER BY created_at, rowid",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Trainer::from).collect())
}

/// Renames a trainer and any live sessions that carry the old name.
#[instrument(skip(pool))]
pub async fn update_trainer_name(
    pool: &Pool<Sqlite>,
    id: &str,
    name: &str,
) -> Result<u64, AppError> {
    info!("Updating trainer name");
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE trainers SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::AlreadyExists("Trainer already exists".to_string())
            } else {
                AppError::Database(err)
            }
        })?;

    sqlx::query("UPDATE sessions SET trainer_name = ? WHERE trainer_id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

#[instrument(skip(pool, password_hash))]
pub async fn update_trainer_password_hash(
    pool: &Pool<Sqlite>,
    id: &str,
    password_hash: &str,
) -> Result<u64, AppError> {
    info!("Updating trainer password");
    let result = sqlx::query("UPDATE trainers SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Counts removed by [`delete_trainer_cascade`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub trainers: u64,
    pub projects: u64,
    pub sessions: u64,
}

/// Removes a trainer together with its projects and sessions in one
/// transaction.
#[instrument(skip(pool))]
pub async fn delete_trainer_cascade(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<CascadeOutcome, AppError> {
    info!("Deleting trainer with projects and sessions");
    let mut tx = pool.begin().await?;

    let trainers = sqlx::query("DELETE FROM trainers WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let projects = sqlx::query("DELETE FROM projects WHERE owner_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let sessions = sqlx::query("DELETE FROM sessions WHERE trainer_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!(trainers, projects, sessions, "Cascade delete finished");
    Ok(CascadeOutcome {
        trainers,
        projects,
        sessions,
    })
}

#[instrument(skip(pool, fields))]
pub async fn insert_project(
    pool: &Pool<Sqlite>,
    owner_id: &str,
    fields: &ProjectFields,
) -> Result<String, AppError> {
    info!("Inserting project");
    let id = new_id();
    let now = Utc::now().naive_utc();

    sqlx::query(
        "INSERT INTO projects (id, owner_id, date, name, details, remarks, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&fields.date)
    .bind(&fields.project_name)
    .bind(&fields.project_details)
    .bind(&fields.remarks)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

#[instrument(skip(pool))]
pub async fn get_projects_with_owner_names(
    pool: &Pool<Sqlite>,
) -> Result<Vec<OwnedProject>, AppError> {
    info!("Getting all projects with owner names");
    let rows = sqlx::query_as::<_, DbProject>(
        "SELECT p.id, p.owner_id, p.date, p.name, p.details, p.remarks, p.created_at,
                t.name AS owner_name
         FROM projects p
         LEFT JOIN trainers t ON t.id = p.owner_id
         ORDER BY p.created_at, p.rowid",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OwnedProject::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_projects_for_owner(
    pool: &Pool<Sqlite>,
    owner_id: &str,
) -> Result<Vec<Project>, AppError> {
    info!("Getting projects for owner");
    let rows = sqlx::query_as::<_, DbProject>(
        "SELECT id, owner_id, date, name, details, remarks, created_at
         FROM projects
         WHERE owner_id = ?
         ORDER BY created_at, rowid",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Project::from).collect())
}

/// Overwrites the editable fields of a project.
///
/// With `owner_id` set the row must also belong to that owner and the count
/// is of rows matched. Without it only rows whose values actually change are
/// counted, so rewriting identical values reports 0.
#[instrument(skip(pool, fields))]
pub async fn update_project(
    pool: &Pool<Sqlite>,
    id: &str,
    owner_id: Option<&str>,
    fields: &ProjectFields,
) -> Result<u64, AppError> {
    info!("Updating project");
    let result = sqlx::query(
        "UPDATE projects
         SET date = ?1, name = ?2, details = ?3, remarks = ?4
         WHERE id = ?5
           AND (?6 IS NULL OR owner_id = ?6)
           AND (?6 IS NOT NULL
                OR date IS NOT ?1 OR name IS NOT ?2
                OR details IS NOT ?3 OR remarks IS NOT ?4)",
    )
    .bind(&fields.date)
    .bind(&fields.project_name)
    .bind(&fields.project_details)
    .bind(&fields.remarks)
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[instrument(skip(pool))]
pub async fn delete_project(
    pool: &Pool<Sqlite>,
    id: &str,
    owner_id: Option<&str>,
) -> Result<u64, AppError> {
    info!("Deleting project");
    let result = sqlx::query("DELETE FROM projects WHERE id = ? AND (?2 IS NULL OR owner_id = ?2)")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[instrument(skip(pool, token, trainer_name))]
pub async fn create_session(
    pool: &Pool<Sqlite>,
    token: &str,
    role: SessionRole,
    trainer_id: Option<&str>,
    trainer_name: Option<&str>,
    expires_at: NaiveDateTime,
) -> Result<(), AppError> {
    info!(role = %role, "Creating session");
    let now = Utc::now().naive_utc();

    sqlx::query(
        "INSERT INTO sessions (token, role, trainer_id, trainer_name, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(token)
    .bind(role.as_str())
    .bind(trainer_id)
    .bind(trainer_name)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument(skip(pool, token))]
pub async fn get_session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<Option<SessionRecord>, AppError> {
    info!("Getting session by token");
    let row = sqlx::query_as::<_, DbUserSession>(
        "SELECT token, role, trainer_id, trainer_name, created_at, expires_at
         FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    row.map(SessionRecord::try_from).transpose()
}

#[instrument(skip(pool, token))]
pub async fn invalidate_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating session");

    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn clean_expired_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    info!("Cleaning expired sessions");

    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
