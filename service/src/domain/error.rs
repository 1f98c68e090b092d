use coursegate_common::{ChapterId, LinkIndex};
use thiserror::Error;

use crate::domain::store::StoreError;

/// Everything a course operation can refuse with.
#[derive(Debug, Error)]
pub enum CourseError {
    #[error("Please check your access code and try again.")]
    InvalidCode,
    #[error("This access code has already been used and cannot be used again.")]
    CodeAlreadyUsed,
    #[error("Invalid admin password.")]
    InvalidAdminPassword,
    #[error("Admin login required.")]
    AdminUnauthorized,
    #[error("Download {index} of chapter {chapter} is not available yet.")]
    DownloadLinkUnconfigured { chapter: ChapterId, index: LinkIndex },
    #[error("Please complete the previous chapter to unlock chapter {0}.")]
    ChapterLockedAttempt(ChapterId),
    #[error("Chapter {0} not found.")]
    ChapterNotFound(ChapterId),
    #[error("An access code is required to view the course.")]
    NotLoggedIn,
    #[error("Deleting all codes cannot be undone and must be confirmed.")]
    ConfirmationRequired,
    #[error(transparent)]
    Store(#[from] StoreError),
}
