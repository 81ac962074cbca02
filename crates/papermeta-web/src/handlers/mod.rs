//! HTTP handlers for all API routes.

pub mod export;
pub mod extract;
pub mod health;
pub mod statistics;
pub mod upload;
pub mod verification;

use papermeta_common::ApiError;

/// Unwrap a required query parameter, or answer 400.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing required query parameter {name:?}")))
}
