use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::CourseError;
use crate::domain::store::StoreError;

// ApiSucess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    ConflictWithServerState(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        tracing::error!("{:?}", value);
        Self::InternalServerError(value.to_string())
    }
}

impl From<CourseError> for ApiError {
    fn from(value: CourseError) -> Self {
        use CourseError::*;

        let message = value.to_string();
        match value {
            InvalidCode | ChapterNotFound(_) | DownloadLinkUnconfigured { .. } => {
                Self::NotFound(message)
            }
            CodeAlreadyUsed => Self::ConflictWithServerState(message),
            InvalidAdminPassword | AdminUnauthorized | NotLoggedIn => Self::Unauthorized(message),
            ChapterLockedAttempt(_) => Self::Forbidden(message),
            ConfirmationRequired => Self::UnprocessableEntity(message),
            Store(cause) => cause.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        let (status, message) = match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ConflictWithServerState(message) => (StatusCode::CONFLICT, message),
            Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Forbidden(message) => (StatusCode::FORBIDDEN, message),
            NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
