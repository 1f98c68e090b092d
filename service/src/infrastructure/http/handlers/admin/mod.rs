use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use coursegate_common::{AccessCode, ChapterId, CodeId, CodePrefix, CourseDefinition};

use crate::domain::AppState;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::auth::AdminSession;
use crate::infrastructure::http::handlers::admin::dto::{
    AdminLoginRequest, AdminLoginResponse, ChapterFieldRequest, CodesResponse, CourseFieldRequest,
    DeleteCodeResponse, GenerateCodeRequest, ResetParams, ResetResponse,
};
use crate::infrastructure::http::querystring::QueryString;

mod dto;

pub async fn login<S: AppState>(
    State(state): State<S>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<ApiSuccess<AdminLoginResponse>, ApiError> {
    let token = state.admin().login(&request.password).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        AdminLoginResponse {
            token: token.as_str().to_string(),
        },
    ))
}

pub async fn list_codes<S: AppState>(
    _: AdminSession,
    State(state): State<S>,
) -> Result<ApiSuccess<CodesResponse>, ApiError> {
    let codes = state.registry().list().await?;
    let stats = codes.as_slice().into();
    Ok(ApiSuccess::new(StatusCode::OK, CodesResponse { codes, stats }))
}

pub async fn generate_code<S: AppState>(
    _: AdminSession,
    State(state): State<S>,
    Json(request): Json<GenerateCodeRequest>,
) -> Result<ApiSuccess<AccessCode>, ApiError> {
    let prefix = match request.prefix {
        Some(prefix) => CodePrefix::try_new(prefix)
            .map_err(|err| ApiError::UnprocessableEntity(err.to_string()))?,
        None => CodePrefix::default(),
    };

    let code = state.registry().generate(&prefix).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, code))
}

pub async fn delete_code<S: AppState>(
    _: AdminSession,
    Path(id): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<DeleteCodeResponse>, ApiError> {
    let deleted = state.registry().delete(&CodeId::from(id)).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DeleteCodeResponse { deleted }))
}

pub async fn reset_codes<S: AppState>(
    _: AdminSession,
    QueryString(params): QueryString<ResetParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<ResetResponse>, ApiError> {
    let removed = state
        .registry()
        .reset_all(params.confirm.unwrap_or(false))
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, ResetResponse { removed }))
}

pub async fn get_course<S: AppState>(
    _: AdminSession,
    State(state): State<S>,
) -> Result<ApiSuccess<CourseDefinition>, ApiError> {
    let course = state.editor().course().await?;
    Ok(ApiSuccess::new(StatusCode::OK, course))
}

pub async fn update_course<S: AppState>(
    _: AdminSession,
    State(state): State<S>,
    Json(request): Json<CourseFieldRequest>,
) -> Result<ApiSuccess<CourseDefinition>, ApiError> {
    let course = state
        .editor()
        .update_course_field(request.field, request.value)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, course))
}

pub async fn update_chapter<S: AppState>(
    _: AdminSession,
    Path(id): Path<u32>,
    State(state): State<S>,
    Json(request): Json<ChapterFieldRequest>,
) -> Result<ApiSuccess<CourseDefinition>, ApiError> {
    let field = request.chapter_field()?;
    let course = state
        .editor()
        .update_chapter_field(ChapterId(id), field, request.value)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, course))
}
