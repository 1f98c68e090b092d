use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::AppState;
use crate::infrastructure::http::api::ApiError;

/// Proof that the request carries a valid admin token
/// (`Authorization: Bearer <token>`).
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

impl<S: AppState> FromRequestParts<S> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        state.admin().authorize(token).await?;
        Ok(AdminSession)
    }
}
