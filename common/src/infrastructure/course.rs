use anyhow::{Context, anyhow};
use serde::Deserialize;
use std::path::Path;

use crate::domain::{Chapter, ChapterId, CourseDefinition};

/// Load the course seed document from a JSON file.
///
/// The seed is what the store is initialised with on first load, so it must
/// satisfy the same contiguity rule as any stored course.
pub fn load(course_seed_path: &str) -> Result<CourseDefinition, anyhow::Error> {
    let path = Path::new(course_seed_path);

    tracing::debug!("Loading course seed from {}", path.to_string_lossy());

    load_course(path)
}

fn load_course(path: &Path) -> Result<CourseDefinition, anyhow::Error> {
    use std::fs;

    let path_str = path.to_string_lossy().into_owned();

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read course seed file '{}'", path_str))?;

    let course_record = serde_json::from_str::<CourseRecord>(&content)
        .with_context(|| format!("failed to parse JSON course seed '{}'", path_str))?;

    course_record
        .try_into()
        .with_context(|| format!("invalid course seed '{}'", path_str))
}

// internal structs for Deserializing

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseRecord {
    name: String,
    #[serde(default)]
    description: String,
    chapters: Vec<ChapterRecord>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterRecord {
    id: u32,
    title: String,
    #[serde(default)]
    video_url: String,
    #[serde(default)]
    download_links: Vec<String>,
}

impl TryFrom<CourseRecord> for CourseDefinition {
    type Error = anyhow::Error;

    fn try_from(value: CourseRecord) -> Result<Self, Self::Error> {
        let chapters = value
            .chapters
            .into_iter()
            .map(Chapter::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let course = CourseDefinition {
            name: value.name,
            description: value.description,
            chapters,
        };
        course.validate()?;

        Ok(course)
    }
}

impl TryFrom<ChapterRecord> for Chapter {
    type Error = anyhow::Error;

    fn try_from(value: ChapterRecord) -> Result<Self, Self::Error> {
        let mut links = value.download_links.into_iter();
        let download_links = [
            links.next().unwrap_or_default(),
            links.next().unwrap_or_default(),
        ];
        if links.next().is_some() {
            return Err(anyhow!(
                "chapter {} has more than two download links",
                value.id
            ));
        }

        Ok(Chapter {
            id: ChapterId(value.id),
            title: value.title,
            video_url: value.video_url,
            download_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn seed_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_seed_with_missing_links() {
        let file = seed_file(
            r#"{
                "name": "Master Course",
                "chapters": [
                    {"id": 1, "title": "One", "videoUrl": "https://v/1", "downloadLinks": ["https://d/1a"]},
                    {"id": 2, "title": "Two"}
                ]
            }"#,
        );

        let course = load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(course.total_chapters(), 2);
        assert_eq!(course.description, "");
        assert_eq!(course.chapters[0].download_links, ["https://d/1a".to_string(), String::new()]);
        assert_eq!(course.chapters[1].video_url, "");
    }

    #[test]
    fn rejects_non_contiguous_seed() {
        let file = seed_file(
            r#"{"name": "x", "chapters": [{"id": 1, "title": "One"}, {"id": 3, "title": "Three"}]}"#,
        );

        let err = load(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("expected 2"));
    }

    #[test]
    fn rejects_extra_links() {
        let file = seed_file(
            r#"{"name": "x", "chapters": [{"id": 1, "title": "One", "downloadLinks": ["a", "b", "c"]}]}"#,
        );

        assert!(load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn reports_missing_file() {
        let err = load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("failed to read course seed file"));
    }
}
