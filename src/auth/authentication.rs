use rocket::Request;
use rocket::http::{Cookie, Status};
use rocket::request::{FromRequest, Outcome};
use sqlx::{Pool, Sqlite};
use tracing::Instrument;

use super::{SESSION_COOKIE, Session, current_session, session_token};
use crate::telemetry::request_span;

/// Every request resolves to a [`Session`]; anonymous callers are not
/// rejected here. Role checks happen inside the operations themselves.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db = match request.rocket().state::<Pool<Sqlite>>() {
            Some(pool) => pool,
            _ => {
                tracing::error!("Database pool not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        let cookies = request.cookies();
        let token = session_token(cookies);

        match current_session(db, token.as_deref())
            .instrument(tracing::info_span!(parent: &request_span(request), "session_guard"))
            .await
        {
            Ok(session) => {
                if token.is_some() && session == Session::Anonymous {
                    cookies.remove_private(Cookie::build(SESSION_COOKIE));
                }
                Outcome::Success(session)
            }
            Err(err) => {
                err.log_and_record("Session lookup");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
