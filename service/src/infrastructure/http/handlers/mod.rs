use axum::http::StatusCode;

pub mod admin;
pub mod course;
pub mod session;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
