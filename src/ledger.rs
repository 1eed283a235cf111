//! Project entries and who may touch them.
//!
//! Trainer operations always filter on the caller's own id inside the same
//! statement that matches the project id, so a project owned by someone else
//! and a project that does not exist produce the same `NotFound`.

use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::Session;
use crate::db;
use crate::error::AppError;
use crate::models::ProjectFields;
use crate::shaping::{GroupedProjects, group_by_project_name, group_by_trainer};

const NOT_FOUND: &str = "Project not found";
const NOT_FOUND_OR_UNAUTHORIZED: &str = "Project not found or unauthorized";

#[instrument(skip(pool, fields))]
pub async fn create_project(
    pool: &Pool<Sqlite>,
    session: &Session,
    fields: &ProjectFields,
) -> Result<String, AppError> {
    let trainer = session.require_trainer()?;

    let id = db::insert_project(pool, &trainer.id, fields).await?;
    info!(project_id = %id, "Project created");
    Ok(id)
}

#[instrument(skip(pool))]
pub async fn list_for_admin(
    pool: &Pool<Sqlite>,
    session: &Session,
) -> Result<GroupedProjects, AppError> {
    session.require_admin()?;

    let projects = db::get_projects_with_owner_names(pool).await?;
    Ok(group_by_trainer(projects))
}

#[instrument(skip(pool))]
pub async fn list_for_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
) -> Result<GroupedProjects, AppError> {
    let trainer = session.require_trainer()?;

    let projects = db::get_projects_for_owner(pool, &trainer.id).await?;
    Ok(group_by_project_name(projects))
}

#[instrument(skip(pool, fields))]
pub async fn update_as_admin(
    pool: &Pool<Sqlite>,
    session: &Session,
    project_id: &str,
    fields: &ProjectFields,
) -> Result<(), AppError> {
    session.require_admin()?;

    match db::update_project(pool, project_id, None, fields).await? {
        0 => Err(AppError::NotFound(NOT_FOUND.to_string())),
        _ => Ok(()),
    }
}

#[instrument(skip(pool, fields))]
pub async fn update_as_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
    project_id: &str,
    fields: &ProjectFields,
) -> Result<(), AppError> {
    let trainer = session.require_trainer()?;

    match db::update_project(pool, project_id, Some(&trainer.id), fields).await? {
        0 => Err(AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string())),
        _ => Ok(()),
    }
}

#[instrument(skip(pool))]
pub async fn delete_as_admin(
    pool: &Pool<Sqlite>,
    session: &Session,
    project_id: &str,
) -> Result<(), AppError> {
    session.require_admin()?;

    match db::delete_project(pool, project_id, None).await? {
        0 => Err(AppError::NotFound(NOT_FOUND.to_string())),
        _ => Ok(()),
    }
}

#[instrument(skip(pool))]
pub async fn delete_as_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
    project_id: &str,
) -> Result<(), AppError> {
    let trainer = session.require_trainer()?;

    match db::delete_project(pool, project_id, Some(&trainer.id)).await? {
        0 => Err(AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string())),
        _ => Ok(()),
    }
}
