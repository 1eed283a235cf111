//! Login, logout and session lookup.
//!
//! A login always replaces whatever session the client held before, so an
//! administrator and a trainer session never coexist on one cookie jar.

use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, SameSite};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::db;
use crate::error::AppError;

use super::{AdminCredentials, Session, generate_token, verify_password};

pub const SESSION_COOKIE: &str = "session_token";

#[instrument(skip(pool, cookies, admin, password))]
pub async fn login_admin(
    pool: &Pool<Sqlite>,
    cookies: &CookieJar<'_>,
    admin: &AdminCredentials,
    ttl: Duration,
    username: &str,
    password: &str,
) -> Result<Session, AppError> {
    if !admin.verify(username, password) {
        return Err(AppError::InvalidCredentials);
    }

    info!("Administrator logged in");
    establish(pool, cookies, Session::Administrator, ttl).await
}

#[instrument(skip(pool, cookies, password))]
pub async fn login_trainer(
    pool: &Pool<Sqlite>,
    cookies: &CookieJar<'_>,
    ttl: Duration,
    name: &str,
    password: &str,
) -> Result<Session, AppError> {
    let trainer = match db::find_trainer_by_name(pool, name).await? {
        Some(trainer) if verify_password(password, &trainer.password_hash) => trainer,
        _ => return Err(AppError::InvalidCredentials),
    };

    info!(trainer_id = %trainer.id, "Trainer logged in");
    establish(pool, cookies, Session::trainer(trainer.id, trainer.name), ttl).await
}

/// Clears the session record and cookie. Safe to call without a session.
#[instrument(skip_all)]
pub async fn logout(pool: &Pool<Sqlite>, cookies: &CookieJar<'_>) {
    if let Some(token) = session_token(cookies) {
        if let Err(err) = db::invalidate_session(pool, &token).await {
            warn!(error = %err, "Failed to invalidate session record");
        }
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE));
}

/// Resolves a cookie token to a session; anything unknown or expired is
/// anonymous.
#[instrument(skip_all)]
pub async fn current_session(
    pool: &Pool<Sqlite>,
    token: Option<&str>,
) -> Result<Session, AppError> {
    let Some(token) = token else {
        return Ok(Session::Anonymous);
    };

    match db::get_session_by_token(pool, token).await? {
        Some(record) if record.is_valid() => Ok(record.session),
        Some(_) => {
            warn!("Session token expired");
            Ok(Session::Anonymous)
        }
        None => {
            warn!("Unknown session token");
            Ok(Session::Anonymous)
        }
    }
}

pub fn session_token(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

async fn establish(
    pool: &Pool<Sqlite>,
    cookies: &CookieJar<'_>,
    session: Session,
    ttl: Duration,
) -> Result<Session, AppError> {
    let role = session.role().ok_or_else(|| {
        AppError::Internal("Cannot establish an anonymous session".to_string())
    })?;

    if let Some(previous) = session_token(cookies) {
        db::invalidate_session(pool, &previous).await?;
    }

    let (trainer_id, trainer_name) = match &session {
        Session::Trainer(identity) => (Some(identity.id.as_str()), Some(identity.name.as_str())),
        _ => (None, None),
    };

    let token = generate_token();
    let expires_at = Utc::now() + ttl;

    db::create_session(
        pool,
        &token,
        role,
        trainer_id,
        trainer_name,
        expires_at.naive_utc(),
    )
    .await?;

    cookies.add_private(
        Cookie::build((SESSION_COOKIE, token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(rocket::time::Duration::seconds(ttl.num_seconds())),
    );

    Ok(session)
}
