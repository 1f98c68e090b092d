use std::fmt::{self, Display};
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod codes;
pub mod course;
pub mod progress;

pub use codes::{AccessCode, CodeId, CodeStats};
pub use course::{
    Chapter, ChapterField, ChapterId, CourseDefinition, CourseDefinitionError, CourseField, LinkIndex,
};
pub use progress::{ChapterState, CompletedChapters, ProgressSummary, lock_state, progress_percentage};

/// Keys of the documents kept in the store. Each key holds one whole JSON
/// document which is replaced on every write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKey {
    #[serde(rename = "courseCodes")]
    CourseCodes,
    #[serde(rename = "courseContent")]
    CourseContent,
    #[serde(rename = "completedChapters")]
    CompletedChapters,
    #[serde(rename = "userLoggedIn")]
    UserLoggedIn,
    #[serde(rename = "currentAccessCode")]
    CurrentAccessCode,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 5] = [
        DocumentKey::CourseCodes,
        DocumentKey::CourseContent,
        DocumentKey::CompletedChapters,
        DocumentKey::UserLoggedIn,
        DocumentKey::CurrentAccessCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::CourseCodes => "courseCodes",
            DocumentKey::CourseContent => "courseContent",
            DocumentKey::CompletedChapters => "completedChapters",
            DocumentKey::UserLoggedIn => "userLoggedIn",
            DocumentKey::CurrentAccessCode => "currentAccessCode",
        }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Prefixes are upper-case letters, digits, underscore and dash, e.g. "COURSE" or "VIP_2025".
// The generated code joins prefix and suffix with a dash.
pub const CODE_PREFIX_REGEX: &str = r"^[A-Z0-9][A-Z0-9_-]*$";

static CODE_PREFIX_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CODE_PREFIX_REGEX).expect("CODE_PREFIX_REGEX must be a valid regex")
});

#[nutype(
    sanitize(trim, uppercase),
    validate(not_empty, len_char_max = 32, regex = CODE_PREFIX_REGEX_COMPILED),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct CodePrefix(String);

impl Default for CodePrefix {
    fn default() -> Self {
        Self::try_new("COURSE").expect("COURSE is a valid code prefix")
    }
}
