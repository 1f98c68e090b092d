use std::fmt::{self, Display};

use nutype::nutype;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DOWNLOAD_LINKS_PER_CHAPTER: usize = 2;

/// The editable course document. Stored whole under `courseContent`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDefinition {
    pub name: String,
    pub description: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub video_url: String,
    pub download_links: [String; DOWNLOAD_LINKS_PER_CHAPTER],
}

/// 1-based position of a chapter in the course.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub u32);

impl ChapterId {
    pub const FIRST: ChapterId = ChapterId(1);

    pub fn previous(&self) -> Option<ChapterId> {
        if self.0 > 1 { Some(ChapterId(self.0 - 1)) } else { None }
    }

    pub fn next(&self) -> ChapterId {
        ChapterId(self.0 + 1)
    }
}

impl From<u32> for ChapterId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into [`Chapter::download_links`].
#[nutype(
    validate(less = 2),
    derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)
)]
pub struct LinkIndex(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseField {
    Name,
    Description,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChapterField {
    Title,
    VideoUrl,
    DownloadLink(LinkIndex),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CourseDefinitionError {
    #[error("course has no chapters")]
    NoChapters,
    #[error("chapter at position {position} has id {found}, expected {position}")]
    NonContiguousChapters { position: u32, found: ChapterId },
}

impl CourseDefinition {
    /// Course content used when nothing has been stored yet.
    pub fn placeholder() -> Self {
        let titles = [
            "Foundation Principles",
            "Advanced Techniques",
            "Implementation Mastery",
            "Expert Optimization",
        ];
        Self {
            name: "Master Course".to_string(),
            description: "Transform your knowledge in four chapters".to_string(),
            chapters: titles
                .iter()
                .zip(1u32..)
                .map(|(title, id)| Chapter {
                    id: ChapterId(id),
                    title: title.to_string(),
                    video_url: "https://www.youtube.com/embed/dQw4w9WgXcQ".to_string(),
                    download_links: [String::new(), String::new()],
                })
                .collect(),
        }
    }

    /// Chapter ids must be `1..=n` in order; gating relies on it.
    pub fn validate(&self) -> Result<(), CourseDefinitionError> {
        if self.chapters.is_empty() {
            return Err(CourseDefinitionError::NoChapters);
        }
        for (chapter, position) in self.chapters.iter().zip(1u32..) {
            if chapter.id.0 != position {
                return Err(CourseDefinitionError::NonContiguousChapters {
                    position,
                    found: chapter.id,
                });
            }
        }
        Ok(())
    }

    pub fn total_chapters(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_mut(&mut self, id: ChapterId) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id == id)
    }

    pub fn is_last(&self, id: ChapterId) -> bool {
        self.chapters.last().map(|c| c.id == id).unwrap_or(false)
    }

    pub fn set_field(&mut self, field: CourseField, value: String) {
        match field {
            CourseField::Name => self.name = value,
            CourseField::Description => self.description = value,
        }
    }
}

impl Chapter {
    pub fn set_field(&mut self, field: ChapterField, value: String) {
        match field {
            ChapterField::Title => self.title = value,
            ChapterField::VideoUrl => self.video_url = value,
            ChapterField::DownloadLink(index) => {
                self.download_links[index.into_inner()] = value;
            }
        }
    }

    /// The configured link, or `None` for a blank or `#` placeholder.
    pub fn download_link(&self, index: LinkIndex) -> Option<&str> {
        let link = self.download_links[index.into_inner()].trim();
        if link.is_empty() || link == "#" { None } else { Some(link) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_four_contiguous_chapters() {
        let course = CourseDefinition::placeholder();
        assert_eq!(course.total_chapters(), 4);
        assert_eq!(course.validate(), Ok(()));
        assert!(course.is_last(ChapterId(4)));
    }

    #[test]
    fn validate_rejects_gaps() {
        let mut course = CourseDefinition::placeholder();
        course.chapters.remove(1);
        assert_eq!(
            course.validate(),
            Err(CourseDefinitionError::NonContiguousChapters {
                position: 2,
                found: ChapterId(3)
            })
        );
    }

    #[test]
    fn chapter_field_edits_touch_only_that_field() {
        let mut course = CourseDefinition::placeholder();
        let second = LinkIndex::try_new(1).unwrap();
        let chapter = course.chapter_mut(ChapterId(2)).unwrap();

        chapter.set_field(ChapterField::DownloadLink(second), "https://cdn.example/guide.pdf".into());
        chapter.set_field(ChapterField::Title, "Renamed".into());

        let chapter = course.chapter(ChapterId(2)).unwrap();
        assert_eq!(chapter.title, "Renamed");
        assert_eq!(chapter.download_links[0], "");
        assert_eq!(chapter.download_link(second), Some("https://cdn.example/guide.pdf"));
    }

    #[test]
    fn placeholder_links_are_unconfigured() {
        let mut chapter = CourseDefinition::placeholder().chapters.remove(0);
        let first = LinkIndex::try_new(0).unwrap();
        assert_eq!(chapter.download_link(first), None);

        chapter.download_links[0] = " # ".to_string();
        assert_eq!(chapter.download_link(first), None);
    }

    #[test]
    fn link_index_is_bounded() {
        assert!(LinkIndex::try_new(2).is_err());
    }

    #[test]
    fn previous_of_first_chapter_is_none() {
        assert_eq!(ChapterId::FIRST.previous(), None);
        assert_eq!(ChapterId(3).previous(), Some(ChapterId(2)));
    }
}
