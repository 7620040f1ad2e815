//! Error handling for the Distillery Operations Platform
//!
//! Provides consistent JSON error responses. Bad measurement data is not an
//! error here; it comes back as flags on the computed result.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::bottling::BottlingError;
use shared::dilution::DilutionError;
use shared::import::ImportError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Calculation errors
    #[error(transparent)]
    Dilution(#[from] DilutionError),

    #[error(transparent)]
    Bottling(#[from] BottlingError),

    #[error(transparent)]
    Import(#[from] ImportError),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: String, field: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone(), None),
            ),
            AppError::MalformedBody(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("MALFORMED_BODY", msg.clone(), None),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource), None),
            ),
            AppError::Dilution(err) => match err {
                DilutionError::RecipeNotFound(name) => (
                    StatusCode::NOT_FOUND,
                    ErrorDetail::new("RECIPE_NOT_FOUND", err.to_string(), Some(name.clone())),
                ),
                DilutionError::InvalidVolume(_) => (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new(
                        "VALIDATION_ERROR",
                        err.to_string(),
                        Some("volume_l".to_string()),
                    ),
                ),
                DilutionError::InvalidAbv(_) => (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new(
                        "VALIDATION_ERROR",
                        err.to_string(),
                        Some("abv_percent".to_string()),
                    ),
                ),
                DilutionError::UnderProof { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorDetail::new(
                        "UNDER_PROOF",
                        err.to_string(),
                        Some("abv_percent".to_string()),
                    ),
                ),
                DilutionError::InvalidMasterBatch(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorDetail::new("INVALID_RECIPE", err.to_string(), None),
                ),
            },
            AppError::Bottling(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "OVER_ALLOCATED",
                    err.to_string(),
                    Some("bottle_entries".to_string()),
                ),
            ),
            AppError::Import(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("IMPORT_PARSE_ERROR", err.to_string(), None),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                ),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            });

        match first {
            Some((field, message)) => AppError::Validation { field, message },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
