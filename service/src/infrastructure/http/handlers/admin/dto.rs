use coursegate_common::{AccessCode, ChapterField, CodeStats, CourseField, LinkIndex};
use serde::{Deserialize, Serialize};

use crate::infrastructure::http::api::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateCodeRequest {
    pub prefix: Option<String>,
}

/// Response for list codes route
#[derive(Debug, Clone, Serialize)]
pub struct CodesResponse {
    pub codes: Vec<AccessCode>,
    pub stats: CodeStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCodeResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetParams {
    pub confirm: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub removed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseFieldRequest {
    pub field: CourseField,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChapterFieldName {
    Title,
    VideoUrl,
    DownloadLink,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterFieldRequest {
    pub field: ChapterFieldName,
    pub value: String,
    pub link_index: Option<usize>,
}

impl ChapterFieldRequest {
    pub fn chapter_field(&self) -> Result<ChapterField, ApiError> {
        match (self.field, self.link_index) {
            (ChapterFieldName::Title, _) => Ok(ChapterField::Title),
            (ChapterFieldName::VideoUrl, _) => Ok(ChapterField::VideoUrl),
            (ChapterFieldName::DownloadLink, Some(index)) => LinkIndex::try_new(index)
                .map(ChapterField::DownloadLink)
                .map_err(|err| ApiError::UnprocessableEntity(err.to_string())),
            (ChapterFieldName::DownloadLink, None) => Err(ApiError::UnprocessableEntity(
                "linkIndex is required for downloadLink".to_string(),
            )),
        }
    }
}
