use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AppState;
use crate::domain::error::CourseError;
use crate::domain::progress::SessionStatus;
use crate::domain::registry::Redemption;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    message: String,
    access_code: String,
    used_at: Option<DateTime<Utc>>,
}

/// Login surface: consume an access code and open the session.
pub async fn redeem<S: AppState>(
    State(state): State<S>,
    Json(request): Json<RedeemRequest>,
) -> Result<ApiSuccess<RedeemResponse>, ApiError> {
    match state.registry().redeem(&request.code).await? {
        Redemption::Success(code) => Ok(ApiSuccess::new(
            StatusCode::OK,
            RedeemResponse {
                message: "Access granted. Redirecting to your course...".to_string(),
                access_code: code.code,
                used_at: code.used_at,
            },
        )),
        Redemption::AlreadyUsed => Err(CourseError::CodeAlreadyUsed.into()),
        Redemption::NotFound => Err(CourseError::InvalidCode.into()),
    }
}

pub async fn session_status<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<SessionStatus>, ApiError> {
    let status = state.progress().session().await?;
    Ok(ApiSuccess::new(StatusCode::OK, status))
}

pub async fn logout<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<SessionStatus>, ApiError> {
    state.progress().logout().await?;
    let status = state.progress().session().await?;
    Ok(ApiSuccess::new(StatusCode::OK, status))
}
