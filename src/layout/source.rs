use super::store::{LayoutStore, LocalLayouts};
use super::templates::TemplateCatalog;
use crate::model::LayoutDocument;
use ahash::AHashMap;
use std::fmt;

/// Where the authoritative copy of a layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutSource {
    Server,
    LocalStore,
    Template,
    Placeholder,
}

impl fmt::Display for LayoutSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutSource::Server => "server",
            LayoutSource::LocalStore => "local-store",
            LayoutSource::Template => "template",
            LayoutSource::Placeholder => "placeholder",
        };
        f.write_str(name)
    }
}

/// Lifecycle of the layout the session is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unresolved,
    /// Waiting for the server to answer `get-layout` for `key`.
    Loading { key: String },
    Resolved { source: LayoutSource },
    Error { message: String },
}

/// One candidate source of layout documents.
pub trait LayoutProvider {
    fn source(&self) -> LayoutSource;

    /// A document for `layout_id`, or `None` when this source has none.
    fn provide(&mut self, layout_id: &str) -> Option<LayoutDocument>;
}

/// Layouts the server has sent or acknowledged during this session.
#[derive(Debug, Clone, Default)]
pub struct ServerLayoutCache {
    layouts: AHashMap<String, LayoutDocument>,
}

impl ServerLayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc: LayoutDocument) {
        self.layouts.insert(doc.layout_id.clone(), doc);
    }

    pub fn remove(&mut self, layout_id: &str) -> Option<LayoutDocument> {
        self.layouts.remove(layout_id)
    }

    pub fn get(&self, layout_id: &str) -> Option<&LayoutDocument> {
        self.layouts.get(layout_id)
    }

    pub fn contains(&self, layout_id: &str) -> bool {
        self.layouts.contains_key(layout_id)
    }
}

impl LayoutProvider for ServerLayoutCache {
    fn source(&self) -> LayoutSource {
        LayoutSource::Server
    }

    fn provide(&mut self, layout_id: &str) -> Option<LayoutDocument> {
        self.layouts
            .get(layout_id)
            .filter(|doc| doc.layout_id == layout_id)
            .cloned()
    }
}

impl<S: LayoutStore> LayoutProvider for LocalLayouts<S> {
    fn source(&self) -> LayoutSource {
        LayoutSource::LocalStore
    }

    fn provide(&mut self, layout_id: &str) -> Option<LayoutDocument> {
        self.load(layout_id)
    }
}

impl LayoutProvider for TemplateCatalog {
    fn source(&self) -> LayoutSource {
        LayoutSource::Template
    }

    fn provide(&mut self, layout_id: &str) -> Option<LayoutDocument> {
        self.get(layout_id).cloned()
    }
}

/// Picks the authoritative document from an ordered provider list.
pub struct LayoutSourceResolver;

impl LayoutSourceResolver {
    /// Returns the first document offered, trying `providers` in order.
    /// Callers list them highest precedence first.
    pub fn resolve(
        layout_id: &str,
        providers: &mut [&mut dyn LayoutProvider],
    ) -> Option<(LayoutDocument, LayoutSource)> {
        providers.iter_mut().find_map(|provider| {
            provider
                .provide(layout_id)
                .map(|doc| (doc, provider.source()))
        })
    }
}
