use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Presence checks on request bodies, reported as `MissingField`.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: Validate> ValidateRequest for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(missing_field)
    }
}

fn missing_field(errors: ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .into_values()
        .flat_map(|field_errors| field_errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Required field missing".to_string());

    AppError::MissingField(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct NameOnly {
        #[validate(
            required(message = "name is required"),
            length(min = 1, message = "name is required")
        )]
        name: Option<String>,
    }

    #[test]
    fn test_absent_and_empty_are_missing() {
        for body in [NameOnly { name: None }, NameOnly { name: Some(String::new()) }] {
            match body.validate_request() {
                Err(AppError::MissingField(msg)) => assert_eq!(msg, "name is required"),
                other => panic!("Expected MissingField, got {:?}", other),
            }
        }

        assert!(NameOnly { name: Some("bob".into()) }.validate_request().is_ok());
    }
}
