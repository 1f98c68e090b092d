use coursegate_common::CourseDefinition;

use crate::domain::AppState;
use crate::domain::admin::AdminGate;
use crate::domain::content::CourseEditor;
use crate::domain::progress::ProgressGate;
use crate::domain::registry::CodeRegistry;
use crate::domain::store::DocumentStore;

pub mod http;
pub mod settings;
pub mod store;

#[derive(Clone, Debug)]
pub struct AppStateImpl<S> {
    registry: CodeRegistry<S>,
    editor: CourseEditor<S>,
    progress: ProgressGate<S>,
    admin: AdminGate,
}

impl<S: DocumentStore> AppStateImpl<S> {
    pub fn new(
        store: S,
        seed: CourseDefinition,
        admin_password: &str,
        clear_progress_on_logout: bool,
    ) -> Self {
        let editor = CourseEditor::new(store.clone(), seed);
        Self {
            registry: CodeRegistry::new(store.clone()),
            progress: ProgressGate::new(store, editor.clone(), clear_progress_on_logout),
            editor,
            admin: AdminGate::new(admin_password),
        }
    }
}

impl<S: DocumentStore> AppState for AppStateImpl<S> {
    type S = S;

    fn registry(&self) -> &CodeRegistry<Self::S> {
        &self.registry
    }

    fn editor(&self) -> &CourseEditor<Self::S> {
        &self.editor
    }

    fn progress(&self) -> &ProgressGate<Self::S> {
        &self.progress
    }

    fn admin(&self) -> &AdminGate {
        &self.admin
    }
}
