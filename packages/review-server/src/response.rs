use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::{ReviewError, SessionError};
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(SuccessResponse { success: true, data }).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(SuccessResponse { success: true, data })).into_response()
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message,
            code: self.code.to_string(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(_) => Self::validation(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::not_found(err.to_string()),
            SessionError::AlreadyFinished(_) => Self::conflict(err.to_string()),
            SessionError::UserMismatch(_) => Self::forbidden(err.to_string()),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Store(err) => err.into(),
            ReviewError::Session(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "rejected request body");
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "rejected query string");
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn session_errors_map_to_status() {
        let id = Uuid::nil();
        assert_eq!(AppError::from(SessionError::NotFound(id)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(SessionError::AlreadyFinished(id)).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(SessionError::UserMismatch(id)).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_errors_map_to_status() {
        let invalid = AppError::from(ReviewError::Store(StoreError::InvalidKey("x".into())));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
