use serde::{Deserialize, Serialize};

use crate::domain::course::ChapterId;

/// Derived state of one chapter for a learner. Never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChapterState {
    Locked,
    UnlockedIncomplete,
    Completed,
}

impl ChapterState {
    pub fn is_unlocked(&self) -> bool {
        !matches!(self, ChapterState::Locked)
    }
}

/// Chapter ids the learner has finished, in completion order.
/// Stored whole under `completedChapters`; ids are only ever appended.
/// Loading drops repeated ids, so the set counts each chapter once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ChapterId>", into = "Vec<ChapterId>")]
pub struct CompletedChapters(Vec<ChapterId>);

impl CompletedChapters {
    pub fn contains(&self, id: ChapterId) -> bool {
        self.0.contains(&id)
    }

    /// Returns false when the chapter was already completed.
    pub fn insert(&mut self, id: ChapterId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChapterId> {
        self.0.iter()
    }

    /// Completed chapters that exist in a course of `total` chapters.
    pub fn count_within(&self, total: usize) -> usize {
        self.0
            .iter()
            .filter(|id| id.0 >= 1 && (id.0 as usize) <= total)
            .count()
    }
}

impl FromIterator<ChapterId> for CompletedChapters {
    fn from_iter<T: IntoIterator<Item = ChapterId>>(iter: T) -> Self {
        let mut completed = CompletedChapters::default();
        for id in iter {
            completed.insert(id);
        }
        completed
    }
}

impl From<Vec<ChapterId>> for CompletedChapters {
    fn from(ids: Vec<ChapterId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<CompletedChapters> for Vec<ChapterId> {
    fn from(completed: CompletedChapters) -> Self {
        completed.0
    }
}

/// The one chapter gate: chapter 1 is always open, chapter `i` opens once `i-1` is done.
pub fn lock_state(chapter: ChapterId, completed: &CompletedChapters) -> ChapterState {
    if completed.contains(chapter) {
        return ChapterState::Completed;
    }
    match chapter.previous() {
        None => ChapterState::UnlockedIncomplete,
        Some(previous) if completed.contains(previous) => ChapterState::UnlockedIncomplete,
        Some(_) => ChapterState::Locked,
    }
}

/// Rounded percentage, 0 for an empty course.
pub fn progress_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub course_completed: bool,
}

impl ProgressSummary {
    pub fn new(completed: &CompletedChapters, total: usize) -> Self {
        let completed = completed.count_within(total);
        Self {
            completed,
            total,
            percentage: progress_percentage(completed, total),
            course_completed: total > 0 && completed == total,
        }
    }
}
