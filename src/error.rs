use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::{self, Json};
use serde_json::error::Category;
use thiserror::Error;
use tracing::{Span, error, warn};

use crate::api::MessageResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Malformed request body")]
    MalformedBody(String),

    #[error("Request body has missing or unrecognized fields")]
    UnrecognizedFields(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        let error_kind = match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error");
                "database_error"
            }
            AppError::Unauthorized => {
                warn!(context = %ctx, "Unauthorized request");
                "authorization_error"
            }
            AppError::InvalidCredentials => {
                warn!(context = %ctx, "Login rejected");
                "authentication_error"
            }
            AppError::MissingField(msg) => {
                warn!(message = %msg, context = %ctx, "Missing field");
                "validation_error"
            }
            AppError::AlreadyExists(msg) => {
                warn!(message = %msg, context = %ctx, "Duplicate record");
                "conflict_error"
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, context = %ctx, "Not found error");
                "not_found_error"
            }
            AppError::MalformedBody(detail) | AppError::UnrecognizedFields(detail) => {
                warn!(detail = %detail, context = %ctx, "Rejected request body");
                "validation_error"
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal error");
                "internal_error"
            }
        };

        if is_valid_span {
            current_span.record(ERROR_TYPE, error_kind);
            current_span.record("error.message", tracing::field::display(&message));

            if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
                current_span.record(OTEL_STATUS_CODE, tracing::field::display("ERROR"));
            }
        }
    }

    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) => Status::InternalServerError,
            AppError::Unauthorized => Status::Unauthorized,
            AppError::InvalidCredentials => Status::Unauthorized,
            AppError::MissingField(_) => Status::BadRequest,
            AppError::AlreadyExists(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::MalformedBody(_) => Status::BadRequest,
            AppError::UnrecognizedFields(_) => Status::UnprocessableEntity,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Message safe to hand to a client. Store and internal failures keep
    /// their detail in the logs only.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        self.log_and_record(&format!("Request to {} {}", req.method(), req.uri()));

        Custom(
            self.status_code(),
            Json(MessageResponse::failure(self.public_message())),
        )
        .respond_to(req)
    }
}

/// Mirrors Rocket's own `Json` guard: data errors (unknown or mistyped
/// fields) are 422, everything else is 400.
impl From<json::Error<'_>> for AppError {
    fn from(error: json::Error<'_>) -> Self {
        match error {
            json::Error::Parse(_, err) if err.classify() == Category::Data => {
                AppError::UnrecognizedFields(err.to_string())
            }
            other => AppError::MalformedBody(other.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Cryptography error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AppError::Unauthorized.status_code(), Status::Unauthorized);
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            Status::Unauthorized
        );
        assert_eq!(
            AppError::MissingField("x".into()).status_code(),
            Status::BadRequest
        );
        assert_eq!(
            AppError::AlreadyExists("x".into()).status_code(),
            Status::BadRequest
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            Status::NotFound
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            Status::InternalServerError
        );
    }

    #[test]
    fn test_body_errors_follow_rocket_json_statuses() {
        let unknown_field = serde_json::from_str::<crate::models::ProjectFields>(r#"{"owner":"x"}"#)
            .unwrap_err();
        let err = AppError::from(json::Error::Parse(r#"{"owner":"x"}"#, unknown_field));
        assert_eq!(err.status_code(), Status::UnprocessableEntity);
        assert_eq!(
            err.public_message(),
            "Request body has missing or unrecognized fields"
        );

        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = AppError::from(json::Error::Parse("{not json", syntax));
        assert_eq!(err.status_code(), Status::BadRequest);
        assert_eq!(err.public_message(), "Malformed request body");
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::Internal("hash backend exploded".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::NotFound("Project not found".into());
        assert_eq!(err.public_message(), "Project not found");
    }
}
