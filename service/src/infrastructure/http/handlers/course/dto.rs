use coursegate_common::course::DOWNLOAD_LINKS_PER_CHAPTER;
use coursegate_common::{ChapterState, LinkIndex, ProgressSummary};
use serde::Serialize;

use crate::domain::progress::{ChapterOverview, ChapterView, CourseOverview};

/// Response for the course overview route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOverviewResponse {
    name: String,
    description: String,
    chapters: Vec<ChapterSummaryResponse>,
    progress: ProgressSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummaryResponse {
    id: u32,
    title: String,
    state: ChapterState,
}

/// Response for one chapter route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    id: u32,
    title: String,
    video_url: String,
    downloads: Vec<DownloadSlotResponse>,
    state: ChapterState,
    previous_chapter: Option<u32>,
    next_chapter: Option<u32>,
    next_unlocked: bool,
}

/// The link itself is served by the download route once configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSlotResponse {
    index: usize,
    available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteChapterResponse {
    pub chapter: u32,
    pub newly_completed: bool,
    pub progress: ProgressSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadResponse {
    pub url: String,
}

impl From<CourseOverview> for CourseOverviewResponse {
    fn from(value: CourseOverview) -> Self {
        Self {
            name: value.name,
            description: value.description,
            chapters: value
                .chapters
                .into_iter()
                .map(ChapterSummaryResponse::from)
                .collect(),
            progress: value.progress,
        }
    }
}

impl From<ChapterOverview> for ChapterSummaryResponse {
    fn from(value: ChapterOverview) -> Self {
        Self {
            id: value.id.0,
            title: value.title,
            state: value.state,
        }
    }
}

impl From<ChapterView> for ChapterResponse {
    fn from(value: ChapterView) -> Self {
        let chapter = value.chapter;
        let downloads = (0..DOWNLOAD_LINKS_PER_CHAPTER)
            .filter_map(|index| LinkIndex::try_new(index).ok())
            .map(|index| DownloadSlotResponse {
                index: index.into_inner(),
                available: chapter.download_link(index).is_some(),
            })
            .collect();

        Self {
            id: chapter.id.0,
            title: chapter.title,
            video_url: chapter.video_url,
            downloads,
            state: value.state,
            previous_chapter: value.previous.map(|id| id.0),
            next_chapter: value.next.map(|id| id.0),
            next_unlocked: value.next_unlocked,
        }
    }
}
