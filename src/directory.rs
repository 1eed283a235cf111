//! Trainer accounts. Every operation is administrator-only.

use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::{Session, hash_password};
use crate::db;
use crate::error::AppError;
use crate::models::TrainerUpdate;
use crate::shaping::TrainerView;

#[instrument(skip(pool, password))]
pub async fn create_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
    name: &str,
    password: &str,
) -> Result<String, AppError> {
    session.require_admin()?;

    if name.is_empty() || password.is_empty() {
        return Err(AppError::MissingField(
            "Trainer name and password are required".to_string(),
        ));
    }

    // The UNIQUE constraint on trainers.name backs this up under a race
    if db::find_trainer_by_name(pool, name).await?.is_some() {
        return Err(AppError::AlreadyExists("Trainer already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    let id = db::insert_trainer(pool, name, &password_hash).await?;

    info!(trainer_id = %id, "Trainer created");
    Ok(id)
}

#[instrument(skip(pool))]
pub async fn list_trainers(
    pool: &Pool<Sqlite>,
    session: &Session,
) -> Result<Vec<TrainerView>, AppError> {
    session.require_admin()?;

    let trainers = db::get_all_trainers(pool).await?;
    Ok(trainers.into_iter().map(TrainerView::from).collect())
}

/// Applies whichever fields are present. An empty password leaves the stored
/// hash alone; the name is written as given.
#[instrument(skip(pool, update))]
pub async fn update_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
    id: &str,
    update: &TrainerUpdate,
) -> Result<(), AppError> {
    session.require_admin()?;

    if let Some(name) = &update.name {
        db::update_trainer_name(pool, id, name).await?;
    }

    if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
        let password_hash = hash_password(password)?;
        db::update_trainer_password_hash(pool, id, &password_hash).await?;
    }

    Ok(())
}

/// Removes the trainer along with every project and session it owns.
#[instrument(skip(pool))]
pub async fn delete_trainer(
    pool: &Pool<Sqlite>,
    session: &Session,
    id: &str,
) -> Result<(), AppError> {
    session.require_admin()?;

    db::delete_trainer_cascade(pool, id).await?;
    Ok(())
}
