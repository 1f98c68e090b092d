use coursegate_common::{
    Chapter, ChapterId, ChapterState, CompletedChapters, CourseDefinition, DocumentKey, LinkIndex,
    ProgressSummary, lock_state,
};
use serde::Serialize;

use crate::domain::content::CourseEditor;
use crate::domain::error::CourseError;
use crate::domain::store::{self, DocumentStore, Modification, StoreError};

const COMPLETED: DocumentKey = DocumentKey::CompletedChapters;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub logged_in: bool,
    pub access_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterOverview {
    pub id: ChapterId,
    pub title: String,
    pub state: ChapterState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseOverview {
    pub name: String,
    pub description: String,
    pub chapters: Vec<ChapterOverview>,
    pub progress: ProgressSummary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterView {
    pub chapter: Chapter,
    pub state: ChapterState,
    pub previous: Option<ChapterId>,
    /// Next chapter id, when there is one.
    pub next: Option<ChapterId>,
    pub next_unlocked: bool,
}

/// Learner session and chapter gating.
///
/// Every learner-facing operation requires the logged-in flag; chapter
/// operations additionally require the chapter to be unlocked.
#[derive(Clone, Debug)]
pub struct ProgressGate<S> {
    store: S,
    editor: CourseEditor<S>,
    clear_on_logout: bool,
}

impl<S: DocumentStore> ProgressGate<S> {
    pub fn new(store: S, editor: CourseEditor<S>, clear_on_logout: bool) -> Self {
        Self {
            store,
            editor,
            clear_on_logout,
        }
    }

    pub async fn session(&self) -> Result<SessionStatus, StoreError> {
        let logged_in = store::load::<_, bool>(&self.store, DocumentKey::UserLoggedIn)
            .await?
            .unwrap_or(false);
        let access_code = if logged_in {
            store::load(&self.store, DocumentKey::CurrentAccessCode).await?
        } else {
            None
        };
        Ok(SessionStatus {
            logged_in,
            access_code,
        })
    }

    pub async fn require_login(&self) -> Result<(), CourseError> {
        if self.session().await?.logged_in {
            Ok(())
        } else {
            Err(CourseError::NotLoggedIn)
        }
    }

    /// Clear the session flags. The used code stays used.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(DocumentKey::UserLoggedIn).await?;
        self.store.remove(DocumentKey::CurrentAccessCode).await?;
        if self.clear_on_logout {
            self.store.remove(COMPLETED).await?;
        }
        tracing::info!(cleared_progress = self.clear_on_logout, "learner logged out");
        Ok(())
    }

    pub async fn completed(&self) -> Result<CompletedChapters, StoreError> {
        Ok(store::load(&self.store, COMPLETED).await?.unwrap_or_default())
    }

    pub async fn overview(&self) -> Result<CourseOverview, CourseError> {
        self.require_login().await?;
        let course = self.editor.course().await?;
        let completed = self.completed().await?;

        let chapters = course
            .chapters
            .iter()
            .map(|chapter| ChapterOverview {
                id: chapter.id,
                title: chapter.title.clone(),
                state: lock_state(chapter.id, &completed),
            })
            .collect();

        Ok(CourseOverview {
            progress: ProgressSummary::new(&completed, course.total_chapters()),
            name: course.name,
            description: course.description,
            chapters,
        })
    }

    pub async fn open_chapter(&self, id: ChapterId) -> Result<ChapterView, CourseError> {
        let (course, completed) = self.unlocked(id).await?;
        let chapter = find_chapter(&course, id)?.clone();

        let next = (!course.is_last(id)).then(|| id.next());
        Ok(ChapterView {
            state: lock_state(id, &completed),
            previous: id.previous(),
            next,
            next_unlocked: next
                .map(|next| lock_state(next, &completed).is_unlocked())
                .unwrap_or(false),
            chapter,
        })
    }

    /// Returns false when the chapter was already completed.
    pub async fn mark_complete(&self, id: ChapterId) -> Result<bool, CourseError> {
        self.unlocked(id).await?;

        let added = self
            .store
            .modify(COMPLETED, |current| -> Result<_, StoreError> {
                let mut completed: CompletedChapters =
                    store::decode(COMPLETED, current)?.unwrap_or_default();
                if !completed.insert(id) {
                    return Ok(Modification::Keep(false));
                }
                Ok(Modification::Write(store::encode(COMPLETED, &completed)?, true))
            })
            .await?;

        if added {
            tracing::info!(chapter = %id, "chapter completed");
        }
        Ok(added)
    }

    pub async fn download_link(&self, id: ChapterId, index: LinkIndex) -> Result<String, CourseError> {
        let (course, _) = self.unlocked(id).await?;
        find_chapter(&course, id)?
            .download_link(index)
            .map(str::to_string)
            .ok_or(CourseError::DownloadLinkUnconfigured { chapter: id, index })
    }

    // Login, existence and lock checks shared by every chapter operation.
    async fn unlocked(
        &self,
        id: ChapterId,
    ) -> Result<(CourseDefinition, CompletedChapters), CourseError> {
        self.require_login().await?;
        let course = self.editor.course().await?;
        find_chapter(&course, id)?;

        let completed = self.completed().await?;
        if !lock_state(id, &completed).is_unlocked() {
            tracing::info!(chapter = %id, "locked chapter requested");
            return Err(CourseError::ChapterLockedAttempt(id));
        }
        Ok((course, completed))
    }
}

fn find_chapter(course: &CourseDefinition, id: ChapterId) -> Result<&Chapter, CourseError> {
    course.chapter(id).ok_or(CourseError::ChapterNotFound(id))
}

#[cfg(test)]
mod tests {
    use coursegate_common::test_utils::make_course;

    use super::*;
    use crate::infrastructure::store::memory::InMemoryStore;

    async fn gate(logged_in: bool) -> (ProgressGate<InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::default();
        let editor = CourseEditor::new(store.clone(), make_course(4));
        if logged_in {
            store::save(&store, DocumentKey::UserLoggedIn, &true).await.unwrap();
            store::save(&store, DocumentKey::CurrentAccessCode, &"COURSE-AB12CD").await.unwrap();
        }
        (ProgressGate::new(store.clone(), editor, false), store)
    }

    fn states(overview: &CourseOverview) -> Vec<ChapterState> {
        overview.chapters.iter().map(|c| c.state).collect()
    }

    #[tokio::test]
    async fn views_require_login() {
        let (gate, _) = gate(false).await;

        assert!(matches!(gate.overview().await, Err(CourseError::NotLoggedIn)));
        assert!(matches!(gate.open_chapter(ChapterId(1)).await, Err(CourseError::NotLoggedIn)));
        assert!(matches!(gate.mark_complete(ChapterId(1)).await, Err(CourseError::NotLoggedIn)));
        assert!(matches!(
            gate.download_link(ChapterId(1), LinkIndex::try_new(0).unwrap()).await,
            Err(CourseError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn fresh_learner_sees_only_chapter_one() {
        let (gate, _) = gate(true).await;

        let overview = gate.overview().await.unwrap();

        assert_eq!(
            states(&overview),
            vec![
                ChapterState::UnlockedIncomplete,
                ChapterState::Locked,
                ChapterState::Locked,
                ChapterState::Locked,
            ]
        );
        assert_eq!(overview.progress.percentage, 0);
    }

    #[tokio::test]
    async fn completing_chapter_three_unlocks_four() {
        let (gate, _) = gate(true).await;
        gate.mark_complete(ChapterId(1)).await.unwrap();
        gate.mark_complete(ChapterId(2)).await.unwrap();

        assert!(matches!(
            gate.open_chapter(ChapterId(4)).await,
            Err(CourseError::ChapterLockedAttempt(ChapterId(4)))
        ));

        let third = gate.open_chapter(ChapterId(3)).await.unwrap();
        assert_eq!(third.state, ChapterState::UnlockedIncomplete);
        assert_eq!(third.next, Some(ChapterId(4)));
        assert!(!third.next_unlocked);

        gate.mark_complete(ChapterId(3)).await.unwrap();
        let overview = gate.overview().await.unwrap();
        assert_eq!(overview.progress.percentage, 75);
        assert_eq!(overview.chapters[3].state, ChapterState::UnlockedIncomplete);
    }

    #[tokio::test]
    async fn mark_complete_is_idempotent() {
        let (gate, _) = gate(true).await;

        assert!(gate.mark_complete(ChapterId(1)).await.unwrap());
        assert!(!gate.mark_complete(ChapterId(1)).await.unwrap());

        let completed: Vec<_> = gate.completed().await.unwrap().iter().copied().collect();
        assert_eq!(completed, vec![ChapterId(1)]);
    }

    #[tokio::test]
    async fn locked_chapter_cannot_be_completed() {
        let (gate, _) = gate(true).await;

        let err = gate.mark_complete(ChapterId(2)).await.unwrap_err();

        assert!(matches!(err, CourseError::ChapterLockedAttempt(ChapterId(2))));
        assert_eq!(gate.completed().await.unwrap(), CompletedChapters::default());
    }

    #[tokio::test]
    async fn finishing_every_chapter_completes_the_course() {
        let (gate, _) = gate(true).await;
        for id in 1..=4 {
            gate.mark_complete(ChapterId(id)).await.unwrap();
        }

        let overview = gate.overview().await.unwrap();
        assert!(overview.progress.course_completed);
        assert_eq!(overview.progress.percentage, 100);

        let last = gate.open_chapter(ChapterId(4)).await.unwrap();
        assert_eq!(last.next, None);
    }

    #[tokio::test]
    async fn unknown_chapter_is_not_found() {
        let (gate, _) = gate(true).await;
        assert!(matches!(
            gate.open_chapter(ChapterId(5)).await,
            Err(CourseError::ChapterNotFound(ChapterId(5)))
        ));
    }

    #[tokio::test]
    async fn blank_download_link_is_unconfigured() {
        let (gate, store) = gate(true).await;
        let mut course = make_course(4);
        course.chapters[0].download_links[1] = String::new();
        store::save(&store, DocumentKey::CourseContent, &course).await.unwrap();

        let first = LinkIndex::try_new(0).unwrap();
        let second = LinkIndex::try_new(1).unwrap();
        assert_eq!(
            gate.download_link(ChapterId(1), first).await.unwrap(),
            "https://files.example/1/workbook.pdf"
        );
        assert!(matches!(
            gate.download_link(ChapterId(1), second).await,
            Err(CourseError::DownloadLinkUnconfigured { .. })
        ));
    }

    #[tokio::test]
    async fn logout_keeps_progress_by_default() {
        let (gate, _) = gate(true).await;
        gate.mark_complete(ChapterId(1)).await.unwrap();

        gate.logout().await.unwrap();

        assert_eq!(
            gate.session().await.unwrap(),
            SessionStatus { logged_in: false, access_code: None }
        );
        assert!(gate.completed().await.unwrap().contains(ChapterId(1)));
    }

    #[tokio::test]
    async fn logout_can_clear_progress() {
        let (gate, store) = gate(true).await;
        let clearing = ProgressGate::new(store.clone(), CourseEditor::new(store, make_course(4)), true);
        gate.mark_complete(ChapterId(1)).await.unwrap();

        clearing.logout().await.unwrap();

        assert_eq!(clearing.completed().await.unwrap(), CompletedChapters::default());
    }
}
