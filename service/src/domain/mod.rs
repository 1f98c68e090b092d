use crate::domain::admin::AdminGate;
use crate::domain::content::CourseEditor;
use crate::domain::progress::ProgressGate;
use crate::domain::registry::CodeRegistry;
use crate::domain::store::DocumentStore;

pub mod admin;
pub mod content;
pub mod error;
pub mod progress;
pub mod registry;
pub mod store;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type S: DocumentStore;
    fn registry(&self) -> &CodeRegistry<Self::S>;
    fn editor(&self) -> &CourseEditor<Self::S>;
    fn progress(&self) -> &ProgressGate<Self::S>;
    fn admin(&self) -> &AdminGate;
}
