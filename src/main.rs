#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod config;
mod database;
mod db;
mod directory;
mod env;
mod error;
mod ledger;
mod models;
mod shaping;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{
    api_admin_delete_project, api_admin_login, api_admin_update_project, api_catcher,
    api_check_session, api_create_project, api_create_trainer, api_delete_my_project,
    api_delete_trainer, api_get_all_projects, api_get_my_projects, api_get_trainers,
    api_logout, api_trainer_login, api_update_my_project, api_update_trainer, health, index,
};
use auth::AdminCredentials;
use config::AppConfig;
use db::clean_expired_sessions;
use error::AppError;
use once_cell::sync::Lazy;
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use sqlx::{Pool, Sqlite};
use std::sync::Mutex;
use telemetry::{OtelGuard, TelemetryFairing, init_tracing};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

pub static TELEMETRY_GUARD: Lazy<Mutex<Option<OtelGuard>>> = Lazy::new(|| Mutex::new(None));

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Figment(#[from] rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("{0}")]
    Rocket(#[from] rocket::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let env_result = env::load_environment();

    let guard = init_tracing();
    if let Ok(mut slot) = TELEMETRY_GUARD.lock() {
        *slot = guard;
    }

    match env_result {
        Ok(env) => {
            for file in &env.loaded {
                info!("Loaded environment from: {}", file);
            }
            for file in &env.missing {
                warn!("Environment file {} not found, skipping", file);
            }
        }
        Err(e) => warn!("Failed to load environment files: {}", e),
    }

    let figment = rocket::Config::figment();
    let config = AppConfig::from_figment(&figment)?;
    let admin = AdminCredentials::from_config(&config)?;

    let pool = database::connect(&config.database_url).await?;
    database::apply_schema(&pool).await?;

    spawn_session_cleanup(pool.clone(), SESSION_CLEANUP_INTERVAL);

    init_rocket(figment, pool, config, admin).launch().await?;

    Ok(())
}

/// Purges expired session rows every `every`, starting immediately.
fn spawn_session_cleanup(pool: Pool<Sqlite>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match clean_expired_sessions(&pool).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }
        }
    })
}

pub fn init_rocket(
    figment: Figment,
    pool: Pool<Sqlite>,
    config: AppConfig,
    admin: AdminCredentials,
) -> Rocket<Build> {
    info!(admin = %admin.username(), "Starting project tracker");

    rocket::custom(figment)
        .manage(pool)
        .manage(config)
        .manage(admin)
        .mount("/", routes![index])
        .mount(
            "/api",
            routes![
                api_admin_login,
                api_create_trainer,
                api_get_trainers,
                api_update_trainer,
                api_delete_trainer,
                api_get_all_projects,
                api_admin_update_project,
                api_admin_delete_project,
                api_trainer_login,
                api_get_my_projects,
                api_create_project,
                api_update_my_project,
                api_delete_my_project,
                api_check_session,
                api_logout,
                health,
            ],
        )
        .register("/", catchers![api_catcher])
        .attach(TelemetryFairing)
}
