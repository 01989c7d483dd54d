use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ApiError, FieldError};

/// Request payloads that check their own field rules before they reach a
/// repository.
pub trait Validatable {
    fn validate_fields(&self) -> Result<(), ApiError>;
}

impl<T: Validate> Validatable for T {
    fn validate_fields(&self) -> Result<(), ApiError> {
        self.validate()
            .map_err(|errors| ApiError::InvalidInput(field_errors(&errors)))
    }
}

/// Flattens validator output into one error per field, sorted by field name.
/// A blank value reports as blank even if a length rule also failed.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs
                .iter()
                .find(|e| e.code == "required")
                .or_else(|| errs.first())?;
            Some(FieldError {
                field: field.to_string(),
                error: first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Rejects empty strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required").with_message("cannot be blank".into()));
    }
    Ok(())
}

/// JSON body extractor that hides deserialization details from the caller.
/// The rejection is logged and answered with a plain bad request.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                log_rejection(&rejection);
                Err(ApiError::BadRequest)
            }
        }
    }
}

fn log_rejection(rejection: &JsonRejection) {
    tracing::info!("rejected request body: {}", rejection.body_text());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank"), length(max = 5, message = "too long"))]
        name: String,
        #[validate(length(max = 3, message = "too long"))]
        code: Option<String>,
    }

    #[test]
    fn blank_wins_over_other_rules() {
        let sample = Sample {
            name: String::new(),
            code: None,
        };
        match sample.validate_fields() {
            Err(ApiError::InvalidInput(errors)) => {
                assert_eq!(
                    errors,
                    vec![FieldError {
                        field: "name".into(),
                        error: "cannot be blank".into()
                    }]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn errors_are_sorted_by_field() {
        let sample = Sample {
            name: "toolong".into(),
            code: Some("abcd".into()),
        };
        match sample.validate_fields() {
            Err(ApiError::InvalidInput(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["code", "name"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn valid_payload_passes() {
        let sample = Sample {
            name: "ok".into(),
            code: None,
        };
        assert!(sample.validate_fields().is_ok());
    }
}
