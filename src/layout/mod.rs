//! Layout reconciliation and persistence.
//!
//! A `LayoutSession` owns the working copy of one diagram. It resolves the
//! document from the server cache, the local store and the built-in
//! templates (in that order), tracks unsaved edits, and persists through the
//! local store first and the server channel second.

pub mod changes;
pub mod dirty;
pub mod export;
pub mod import;
pub mod persistence;
pub mod session;
pub mod source;
pub mod store;
pub mod templates;

pub use changes::{EdgeChange, NodeChange};
pub use dirty::{ChangeKind, DirtyState, DirtyTracker};
pub use export::ExportFile;
pub use import::{BulkImport, ImportValidator, RejectedLayout};
pub use persistence::{PersistenceCoordinator, SaveOutcome, SavePhase, SaveTrigger};
pub use session::{LayoutSession, SessionEvent};
pub use source::{LayoutProvider, LayoutSource, LayoutSourceResolver, LoadState, ServerLayoutCache};
pub use store::{FileStore, LayoutStore, LocalLayouts, MemoryStore};
pub use templates::TemplateCatalog;
