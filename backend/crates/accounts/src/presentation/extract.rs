//! Validated JSON Extractor
//!
//! Deserializes the body, then runs the request schema's validation. Both a
//! malformed body and invalid fields come back as a 400 with field errors.

use axum::Json;
use axum::extract::{FromRequest, Request};
use kernel::error::validation::ValidationErrors;
use serde::de::DeserializeOwned;

use crate::error::AccountError;
use crate::presentation::action::Schema;

/// A request body with a schema
///
/// `validate` turns the raw body into the typed use-case input, collecting
/// every field error instead of stopping at the first one.
pub trait RequestSchema: DeserializeOwned + Send {
    const SCHEMA: Schema;

    type Valid: Send;

    fn validate(self) -> Result<Self::Valid, ValidationErrors>;
}

pub struct ValidatedJson<T: RequestSchema>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(
                    schema = T::SCHEMA.name(),
                    error = %rejection.body_text(),
                    "Malformed request body"
                );
                AccountError::Validation(ValidationErrors::non_field(rejection.body_text()))
            })?;

        body.validate().map(ValidatedJson).map_err(|errors| {
            tracing::debug!(schema = T::SCHEMA.name(), errors = %errors, "Validation failed");
            AccountError::Validation(errors)
        })
    }
}
