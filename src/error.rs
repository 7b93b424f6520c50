use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::utils::auth::AuthError;
use crate::utils::upload::UploadError;

/// Every failure a handler can surface to the caller.
///
/// The `Display` text of a variant is exactly the `message` sent in the
/// `{status: false, message}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate email, phone or title. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Unclassified failure; the raw text of the cause is passed through.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "status": false,
            "message": self.to_string(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => Self::Conflict(message),
            other => {
                log::error!("store failure: {other}");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        log::error!("image upload failed: {err}");
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => {
                Self::Unauthorized("authentication failed : token not found".to_string())
            }
            AuthError::Expired => {
                Self::Unauthorized("authentication failed : Session expired".to_string())
            }
            AuthError::InvalidToken(_) => Self::Unauthorized("authentication failed".to_string()),
            AuthError::Hash(_) | AuthError::Signing(_) => Self::Internal(err.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
