//! Request payload validation
//!
//! Every JSON body and list filter goes through [`validated`]: trim via
//! [`Normalize`], then run the `validator` rules declared on the DTO. The
//! first failing field becomes the top-level message, all failures are
//! listed under `details.errors`.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use http::request::Parts;
use serde::de::DeserializeOwned;
use shared::Normalize;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

/// Normalize then validate a payload
pub fn validated<T: Normalize + Validate>(mut payload: T) -> Result<T, AppError> {
    payload.normalize();
    payload.validate().map_err(validation_error)?;
    Ok(payload)
}

/// Normalize a payload that carries no declarative rules (list filters)
pub fn normalized<T: Normalize>(mut payload: T) -> T {
    payload.normalize();
    payload
}

/// Convert `validator` errors into a `ValidationFailed` error
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let messages = flatten(&errors);
    let summary = messages
        .iter()
        .next()
        .map(|(field, list)| {
            let first = list.first().map(String::as_str).unwrap_or("is invalid");
            format!("{field}: {first}")
        })
        .unwrap_or_else(|| "Validation failed".to_string());

    let details = serde_json::to_value(&messages).unwrap_or_default();
    AppError::validation(summary).with_detail("errors", details)
}

fn flatten(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(list) = kind {
            let messages = list
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            out.insert(field.to_string(), messages);
        }
    }
    out
}

/// JSON body extractor that normalizes and validates the payload
///
/// Malformed bodies are reported as `InvalidRequest` in the usual envelope.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Normalize + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::invalid_request(e.body_text()))?;
        Ok(Self(validated(payload)?))
    }
}

/// Query string extractor for list filters, normalized on the way in
pub struct Filter<T>(pub T);

impl<S, T> FromRequestParts<S> for Filter<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Normalize,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(filter) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::invalid_request(e.body_text()))?;
        Ok(Self(normalized(filter)))
    }
}
