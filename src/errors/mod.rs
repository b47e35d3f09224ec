use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use std::fmt;

use crate::db::StoreError;
use crate::models::envelope::ApiResponse;

pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred on the server.";

/// Every failure a request can end with. Each variant carries the message
/// shown to the client, except `Internal` whose detail is only logged.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn employee_not_found() -> Self {
        AppError::NotFound("Employee not found".to_string())
    }

    pub fn duplicate_email() -> Self {
        AppError::Conflict("Email already exists".to_string())
    }

    /// Message returned to the client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => msg,
            AppError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(field) if field == "email" => AppError::duplicate_email(),
            StoreError::UniqueViolation(field) => AppError::Conflict(format!("Data already exists: {}", field)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            error!("{}", detail);
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::empty(self.public_message()))
    }
}
