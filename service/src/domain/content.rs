use std::sync::Arc;

use coursegate_common::{ChapterField, ChapterId, CourseDefinition, CourseField, DocumentKey};
use serde_json::Value;

use crate::domain::error::CourseError;
use crate::domain::store::{self, DocumentStore, Modification, StoreError};

const CONTENT: DocumentKey = DocumentKey::CourseContent;

/// Admin-editable course document stored under `courseContent`.
///
/// The first read of an empty store persists the seed, so every later read
/// and edit works on the stored copy.
#[derive(Clone, Debug)]
pub struct CourseEditor<S> {
    store: S,
    seed: Arc<CourseDefinition>,
}

impl<S: DocumentStore> CourseEditor<S> {
    pub fn new(store: S, seed: CourseDefinition) -> Self {
        Self {
            store,
            seed: Arc::new(seed),
        }
    }

    pub async fn course(&self) -> Result<CourseDefinition, StoreError> {
        if let Some(course) = store::load(&self.store, CONTENT).await? {
            return Ok(course);
        }

        let seed = self.seed.as_ref();
        self.store
            .modify(CONTENT, |current| -> Result<_, StoreError> {
                match store::decode::<CourseDefinition>(CONTENT, current)? {
                    Some(course) => Ok(Modification::Keep(course)),
                    None => {
                        tracing::info!("seeding course content");
                        Ok(Modification::Write(store::encode(CONTENT, seed)?, seed.clone()))
                    }
                }
            })
            .await
    }

    pub async fn update_course_field(
        &self,
        field: CourseField,
        value: String,
    ) -> Result<CourseDefinition, CourseError> {
        let course = self
            .edit(|course| {
                course.set_field(field, value);
                Ok(())
            })
            .await?;

        tracing::info!(?field, "course field updated");
        Ok(course)
    }

    pub async fn update_chapter_field(
        &self,
        chapter: ChapterId,
        field: ChapterField,
        value: String,
    ) -> Result<CourseDefinition, CourseError> {
        let course = self
            .edit(|course| {
                course
                    .chapter_mut(chapter)
                    .ok_or(CourseError::ChapterNotFound(chapter))?
                    .set_field(field, value);
                Ok(())
            })
            .await?;

        tracing::info!(%chapter, ?field, "chapter field updated");
        Ok(course)
    }

    // Read the whole document, apply one edit, write the whole document back.
    async fn edit<F>(&self, apply: F) -> Result<CourseDefinition, CourseError>
    where
        F: FnOnce(&mut CourseDefinition) -> Result<(), CourseError> + Send,
    {
        let seed = self.seed.as_ref();
        self.store
            .modify(CONTENT, |current: Option<Value>| -> Result<_, CourseError> {
                let mut course = store::decode::<CourseDefinition>(CONTENT, current)?
                    .unwrap_or_else(|| seed.clone());
                apply(&mut course)?;
                Ok(Modification::Write(store::encode(CONTENT, &course)?, course))
            })
            .await
    }
}
