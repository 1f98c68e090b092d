use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{AccessCode, Chapter, ChapterId, CodeId, CourseDefinition};

/// Course with `chapters` contiguous chapters, every link configured.
///
/// Public so that other crates can reuse it for their own tests.
pub fn make_course(chapters: u32) -> CourseDefinition {
    CourseDefinition {
        name: "Test Course".to_string(),
        description: "fixture".to_string(),
        chapters: (1..=chapters).map(make_chapter).collect(),
    }
}

pub fn make_chapter(id: u32) -> Chapter {
    Chapter {
        id: ChapterId(id),
        title: format!("Chapter {}", id),
        video_url: format!("https://video.example/{}", id),
        download_links: [
            format!("https://files.example/{}/workbook.pdf", id),
            format!("https://files.example/{}/templates.zip", id),
        ],
    }
}

/// Unused code with a fixed id and creation time.
pub fn make_code(id: &str, code: &str) -> AccessCode {
    AccessCode {
        id: CodeId::from(id),
        code: code.to_string(),
        used: false,
        created_at: fixed_time(),
        used_at: None,
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}
