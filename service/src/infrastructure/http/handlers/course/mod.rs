use axum::extract::{Path, State};
use axum::http::StatusCode;
use coursegate_common::{ChapterId, LinkIndex};

use crate::domain::AppState;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::course::dto::{
    ChapterResponse, CompleteChapterResponse, CourseOverviewResponse, DownloadResponse,
};

mod dto;

pub async fn course_overview<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<CourseOverviewResponse>, ApiError> {
    let overview = state.progress().overview().await?;
    Ok(ApiSuccess::new(StatusCode::OK, overview.into()))
}

pub async fn open_chapter<S: AppState>(
    Path(id): Path<u32>,
    State(state): State<S>,
) -> Result<ApiSuccess<ChapterResponse>, ApiError> {
    let view = state.progress().open_chapter(ChapterId(id)).await?;
    Ok(ApiSuccess::new(StatusCode::OK, view.into()))
}

pub async fn complete_chapter<S: AppState>(
    Path(id): Path<u32>,
    State(state): State<S>,
) -> Result<ApiSuccess<CompleteChapterResponse>, ApiError> {
    let progress = state.progress();
    let newly_completed = progress.mark_complete(ChapterId(id)).await?;
    let overview = progress.overview().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        CompleteChapterResponse {
            chapter: id,
            newly_completed,
            progress: overview.progress,
        },
    ))
}

pub async fn download<S: AppState>(
    Path((id, index)): Path<(u32, usize)>,
    State(state): State<S>,
) -> Result<ApiSuccess<DownloadResponse>, ApiError> {
    let index =
        LinkIndex::try_new(index).map_err(|err| ApiError::UnprocessableEntity(err.to_string()))?;

    let url = state.progress().download_link(ChapterId(id), index).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DownloadResponse { url }))
}
