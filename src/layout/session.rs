use super::changes::{self, EdgeChange, NodeChange};
use super::dirty::{ChangeKind, DirtyState, DirtyTracker};
use super::export::{self, ExportFile};
use super::import::{BulkImport, ImportValidator};
use super::persistence::{PersistenceCoordinator, SaveOutcome, SavePhase, SaveTrigger};
use super::source::{LayoutProvider, LayoutSource, LayoutSourceResolver, LoadState, ServerLayoutCache};
use super::store::{LayoutStore, LocalLayouts};
use super::templates::TemplateCatalog;
use crate::channel::{InboundMessage, LayoutChannel, OutboundMessage, layout_id_from_key, server_key};
use crate::config::SessionConfig;
use crate::error::{ChannelError, LayoutError, PersistenceError, StoreError, ValidationError};
use crate::model::{Edge, GlobalAnimationSettings, LayoutDocument, LayoutMeta, Node, Viewport};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Something the embedding UI may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loaded {
        layout_id: String,
        source: LayoutSource,
    },
    LoadFailed {
        layout_id: String,
        error: String,
    },
    SavedLocally {
        layout_id: String,
        trigger: SaveTrigger,
    },
    SaveDispatched {
        layout_id: String,
        trigger: SaveTrigger,
    },
    SaveConfirmed {
        layout_id: String,
    },
    SaveFailed {
        layout_id: String,
        error: String,
    },
    /// A server copy replaced edits that were never persisted.
    UnsavedChangesDiscarded {
        layout_id: String,
    },
    ChannelError {
        error: String,
    },
    Imported {
        accepted: usize,
        skipped: usize,
    },
}

/// Owns the working copy of one layout at a time and coordinates it with
/// the local store, the server channel and the built-in templates.
///
/// Every input (open, edit, inbound message, timer tick, reconnect) is
/// handled to completion before the next. Time is passed in by the caller.
pub struct LayoutSession<S: LayoutStore, C: LayoutChannel> {
    config: SessionConfig,
    local: LocalLayouts<S>,
    channel: C,
    templates: TemplateCatalog,
    server: ServerLayoutCache,
    tracker: DirtyTracker,
    coordinator: PersistenceCoordinator,
    layout_id: Option<String>,
    document: Option<LayoutDocument>,
    load_state: LoadState,
    events: Vec<SessionEvent>,
}

impl<S: LayoutStore, C: LayoutChannel> LayoutSession<S, C> {
    pub fn new(config: SessionConfig, store: S, channel: C) -> Self {
        let coordinator = PersistenceCoordinator::new(&config);
        Self {
            config,
            local: LocalLayouts::new(store),
            channel,
            templates: TemplateCatalog::builtin(),
            server: ServerLayoutCache::new(),
            tracker: DirtyTracker::new(),
            coordinator,
            layout_id: None,
            document: None,
            load_state: LoadState::Unresolved,
            events: Vec::new(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateCatalog) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn layout_id(&self) -> Option<&str> {
        self.layout_id.as_deref()
    }

    pub fn document(&self) -> Option<&LayoutDocument> {
        self.document.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn dirty_state(&self) -> DirtyState {
        self.tracker.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn save_phase(&self) -> SavePhase {
        self.coordinator.phase()
    }

    pub fn local(&self) -> &LocalLayouts<S> {
        &self.local
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Switches the session to `layout_id` and resolves its document.
    /// Reopening the current layout is a no-op.
    pub fn open(&mut self, layout_id: &str) {
        let same = self.layout_id.as_deref() == Some(layout_id);
        if same && !matches!(self.load_state, LoadState::Unresolved | LoadState::Error { .. }) {
            return;
        }
        if !same {
            if self.tracker.is_dirty() {
                if let Some(previous) = &self.layout_id {
                    warn!("leaving layout id={previous} with unsaved changes");
                }
            }
            self.layout_id = Some(layout_id.to_string());
            self.coordinator.reset();
        }
        self.document = None;
        self.tracker.mark_clean();
        self.resolve_current();
    }

    fn resolve_current(&mut self) {
        let Some(layout_id) = self.layout_id.clone() else {
            return;
        };
        let resolved = {
            let mut providers: [&mut dyn LayoutProvider; 3] =
                [&mut self.server, &mut self.local, &mut self.templates];
            LayoutSourceResolver::resolve(&layout_id, &mut providers)
        };
        match resolved {
            Some((doc, source)) => self.install(doc, source),
            None if self.config.edit_mode => {
                self.install(LayoutDocument::placeholder(&layout_id), LayoutSource::Placeholder)
            }
            None => self.request_from_server(&layout_id),
        }
    }

    fn install(&mut self, doc: LayoutDocument, source: LayoutSource) {
        info!(
            "layout resolved id={} source={source} nodes={} edges={}",
            doc.layout_id,
            doc.nodes.len(),
            doc.edges.len()
        );
        self.events.push(SessionEvent::Loaded {
            layout_id: doc.layout_id.clone(),
            source,
        });
        self.tracker.mark_clean();
        self.coordinator.cancel_pending();
        if source == LayoutSource::Template {
            self.coordinator.request_first_save(&doc);
        }
        self.document = Some(doc);
        self.load_state = LoadState::Resolved { source };
    }

    fn request_from_server(&mut self, layout_id: &str) {
        let key = server_key(layout_id);
        self.load_state = LoadState::Loading { key: key.clone() };
        if !self.channel.is_connected() {
            debug!("waiting for connection to request layout key={key}");
            return;
        }
        if let Err(err) = self.channel.send(OutboundMessage::GetLayout { key: key.clone() }) {
            warn!("layout request failed key={key}: {err}");
            self.events.push(SessionEvent::ChannelError {
                error: err.to_string(),
            });
        }
    }

    fn fail_load(&mut self, layout_id: &str, error: String) {
        warn!("layout load failed id={layout_id}: {error}");
        self.document = Some(if self.config.edit_mode {
            LayoutDocument::placeholder(layout_id)
        } else {
            LayoutDocument::new(layout_id)
        });
        self.tracker.mark_clean();
        self.load_state = LoadState::Error {
            message: error.clone(),
        };
        self.events.push(SessionEvent::LoadFailed {
            layout_id: layout_id.to_string(),
            error,
        });
    }

    fn is_current_key(&self, key: &str) -> bool {
        self.layout_id
            .as_deref()
            .is_some_and(|id| layout_id_from_key(key) == Some(id))
    }

    /// Working document, but only when edits are allowed.
    fn editable(&mut self) -> Option<&mut LayoutDocument> {
        if !self.config.edit_mode {
            debug!("edit ignored: session is read-only");
            return None;
        }
        self.document.as_mut()
    }

    fn after_edit(&mut self, kinds: impl IntoIterator<Item = ChangeKind>, now: Instant) -> bool {
        let dirtied = self.tracker.record_all(kinds);
        if dirtied {
            self.coordinator.schedule(now, &self.tracker);
        }
        dirtied
    }

    /// Applies renderer node changes. Returns true when the document became dirty.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange], now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        changes::apply_node_changes(doc, changes);
        doc.remove_placeholder_if_needed();
        self.after_edit(changes.iter().map(NodeChange::kind), now)
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange], now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        changes::apply_edge_changes(doc, changes);
        doc.remove_placeholder_if_needed();
        self.after_edit(changes.iter().map(EdgeChange::kind), now)
    }

    pub fn add_node(&mut self, node: Node, now: Instant) -> bool {
        self.apply_node_changes(&[NodeChange::Add(node)], now)
    }

    /// Adds an edge between two existing nodes.
    pub fn connect(&mut self, edge: Edge, now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        if doc.node(&edge.source).is_none() || doc.node(&edge.target).is_none() {
            debug!(
                "connection ignored: unknown endpoint {} -> {}",
                edge.source, edge.target
            );
            return false;
        }
        changes::apply_edge_changes(doc, &[EdgeChange::Add(edge)]);
        doc.remove_placeholder_if_needed();
        self.after_edit([ChangeKind::Connect], now)
    }

    /// Removes a node with its attached edges, or a single edge.
    pub fn delete_element(&mut self, id: &str, now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        if doc.node(id).is_some_and(|node| !node.is_placeholder()) {
            doc.nodes.retain(|n| n.id != id);
            doc.edges.retain(|e| !e.touches(id));
        } else if doc.edge(id).is_some() {
            doc.edges.retain(|e| e.id != id);
        } else {
            return false;
        }
        self.after_edit([ChangeKind::Remove], now)
    }

    /// Replaces the canvas with the placeholder. Metadata is kept.
    pub fn reset_layout(&mut self, now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        let placeholder = LayoutDocument::placeholder(&doc.layout_id);
        doc.nodes = placeholder.nodes;
        doc.edges.clear();
        self.after_edit([ChangeKind::Reset], now)
    }

    /// Viewport tracking is not an edit and does not dirty the document.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if let Some(doc) = self.document.as_mut() {
            doc.viewport = Some(viewport);
        }
    }

    pub fn set_global_animation(
        &mut self,
        settings: Option<GlobalAnimationSettings>,
        now: Instant,
    ) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        doc.meta.global_animation_settings = settings;
        self.after_edit([ChangeKind::Meta], now)
    }

    pub fn update_meta(&mut self, update: impl FnOnce(&mut LayoutMeta), now: Instant) -> bool {
        let Some(doc) = self.editable() else {
            return false;
        };
        update(&mut doc.meta);
        self.after_edit([ChangeKind::Meta], now)
    }

    /// Manual save. Cancels any pending auto-save.
    pub fn save(&mut self) -> Result<SaveOutcome, PersistenceError> {
        if !self.config.edit_mode {
            debug!("save ignored: session is read-only");
            return Ok(SaveOutcome::Skipped);
        }
        self.run_save(SaveTrigger::Manual)
            .unwrap_or(Ok(SaveOutcome::Skipped))
    }

    /// Timer tick: fires the auto-save once its window has elapsed. A layout
    /// instantiated from a template opens its first window on the first tick.
    pub fn poll(&mut self, now: Instant) -> Option<Result<SaveOutcome, PersistenceError>> {
        self.coordinator.arm_first_save(now);
        if !self.coordinator.is_due(now) {
            return None;
        }
        let doc = self.document.as_ref()?;
        let result = self.coordinator.poll(
            now,
            doc,
            &mut self.tracker,
            &mut self.local,
            &mut self.channel,
        )?;
        Some(self.record_save(SaveTrigger::Auto, result))
    }

    fn run_save(&mut self, trigger: SaveTrigger) -> Option<Result<SaveOutcome, PersistenceError>> {
        let doc = self.document.as_ref()?;
        let result = self.coordinator.save(
            doc,
            trigger,
            &mut self.tracker,
            &mut self.local,
            &mut self.channel,
        );
        Some(self.record_save(trigger, result))
    }

    fn record_save(
        &mut self,
        trigger: SaveTrigger,
        result: Result<SaveOutcome, PersistenceError>,
    ) -> Result<SaveOutcome, PersistenceError> {
        let layout_id = self.layout_id.clone().unwrap_or_default();
        if result.as_ref().is_ok_and(SaveOutcome::committed) {
            // The local copy is now newer than the last server copy.
            self.server.remove(&layout_id);
        }
        match &result {
            Ok(SaveOutcome::Skipped) => {}
            Ok(SaveOutcome::LocalOnly { channel_error }) => {
                if let Some(err) = channel_error {
                    self.events.push(SessionEvent::ChannelError {
                        error: err.to_string(),
                    });
                }
                self.events.push(SessionEvent::SavedLocally { layout_id, trigger });
            }
            Ok(SaveOutcome::Dispatched { .. }) => {
                self.events.push(SessionEvent::SaveDispatched { layout_id, trigger });
            }
            Err(err) => self.events.push(SessionEvent::SaveFailed {
                layout_id,
                error: err.to_string(),
            }),
        }
        result
    }

    /// The channel came (back) up: send any pending layout request and push
    /// local-only saves.
    pub fn on_channel_connected(&mut self) {
        if let LoadState::Loading { key } = &self.load_state {
            let key = key.clone();
            if let Err(err) = self.channel.send(OutboundMessage::GetLayout { key: key.clone() }) {
                warn!("layout request failed key={key}: {err}");
                self.events.push(SessionEvent::ChannelError {
                    error: err.to_string(),
                });
            }
        }
        if self.config.edit_mode
            && self.coordinator.needs_resync()
            && self.coordinator.in_flight().is_none()
        {
            if let Some(Err(err)) = self.run_save(SaveTrigger::Resync) {
                warn!("resync after reconnect failed: {err}");
            }
        }
    }

    /// Decodes and handles one inbound message.
    pub fn handle_text(&mut self, text: &str) -> Result<(), ChannelError> {
        let message = InboundMessage::from_json(text)?;
        self.handle_message(message);
        Ok(())
    }

    pub fn handle_message(&mut self, message: InboundMessage) {
        if let Some(key) = message.key() {
            if !self.is_current_key(key) {
                debug!("ignoring stale message key={key}");
                return;
            }
        }
        match message {
            InboundMessage::LayoutData { key, layout } => self.on_layout_data(&key, layout),
            InboundMessage::LayoutError { key, error } => {
                let layout_id = layout_id_from_key(&key).unwrap_or_default().to_string();
                if matches!(self.load_state, LoadState::Loading { .. }) {
                    self.fail_load(&layout_id, error);
                } else {
                    warn!("layout error for resolved layout key={key}: {error}");
                    self.events.push(SessionEvent::LoadFailed { layout_id, error });
                }
            }
            InboundMessage::LayoutSavedConfirmation { key } => {
                match self.coordinator.acknowledge(&key, &mut self.tracker) {
                    Some(done) => {
                        info!("layout save confirmed key={key}");
                        self.events.push(SessionEvent::SaveConfirmed {
                            layout_id: done.layout.layout_id.clone(),
                        });
                        self.server.insert(done.layout);
                    }
                    None => debug!("ignoring uncorrelated save confirmation key={key}"),
                }
            }
            InboundMessage::LayoutSaveError { key, error } => {
                match self.coordinator.fail(&key) {
                    Some(failed) => {
                        warn!("server rejected layout save key={key}: {error}");
                        self.events.push(SessionEvent::SaveFailed {
                            layout_id: failed.layout.layout_id,
                            error,
                        });
                    }
                    None => debug!("ignoring uncorrelated save error key={key}"),
                }
            }
            InboundMessage::AllSldLayouts(entries) => self.on_all_layouts(&entries),
        }
    }

    fn on_layout_data(&mut self, key: &str, layout: Option<Value>) {
        let Some(layout_id) = layout_id_from_key(key).map(str::to_string) else {
            return;
        };
        match layout.filter(|raw| !raw.is_null()) {
            Some(raw) => match decode_server_layout(&layout_id, raw) {
                Ok(doc) => {
                    self.server.insert(doc);
                    self.reload_from_server(&layout_id);
                }
                Err(err) => {
                    if matches!(self.load_state, LoadState::Loading { .. }) {
                        self.fail_load(&layout_id, err);
                    } else {
                        warn!("discarding malformed server layout id={layout_id}: {err}");
                    }
                }
            },
            None => {
                self.server.remove(&layout_id);
                if matches!(self.load_state, LoadState::Loading { .. }) {
                    let (doc, source) = if self.config.edit_mode {
                        (LayoutDocument::placeholder(&layout_id), LayoutSource::Placeholder)
                    } else {
                        (LayoutDocument::new(&layout_id), LayoutSource::Server)
                    };
                    self.install(doc, source);
                }
            }
        }
    }

    fn reload_from_server(&mut self, layout_id: &str) {
        if self.tracker.is_dirty() {
            warn!("server copy overwrites unsaved changes id={layout_id}");
            self.events.push(SessionEvent::UnsavedChangesDiscarded {
                layout_id: layout_id.to_string(),
            });
        }
        self.resolve_current();
    }

    fn on_all_layouts(&mut self, entries: &Map<String, Value>) {
        let report = ImportValidator::validate_entries(entries);
        debug!(
            "server pushed {} layout(s), {} skipped",
            report.accepted.len(),
            report.skipped()
        );
        let current = self.layout_id.clone();
        let mut touches_current = false;
        for (layout_id, doc) in report.accepted {
            touches_current |= current.as_deref() == Some(layout_id.as_str());
            self.server.insert(doc);
        }
        let active = matches!(
            self.load_state,
            LoadState::Loading { .. } | LoadState::Resolved { .. }
        );
        if touches_current && active {
            if let Some(layout_id) = current {
                self.reload_from_server(&layout_id);
            }
        }
    }

    /// Removes a layout locally and asks the server to delete it.
    pub fn delete_layout(&mut self, layout_id: &str) -> Result<(), StoreError> {
        self.local.remove(layout_id)?;
        self.server.remove(layout_id);
        if self.channel.is_connected() {
            let key = server_key(layout_id);
            if let Err(err) = self.channel.send(OutboundMessage::DeleteSldLayout { key }) {
                warn!("layout delete not sent id={layout_id}: {err}");
                self.events.push(SessionEvent::ChannelError {
                    error: err.to_string(),
                });
            }
        }
        info!("layout deleted id={layout_id}");
        if self.layout_id.as_deref() == Some(layout_id) {
            self.coordinator.reset();
            self.document = None;
            self.load_state = LoadState::Unresolved;
            self.resolve_current();
        }
        Ok(())
    }

    /// Imports one exported layout file.
    pub fn import_layout(&mut self, text: &str) -> Result<String, ValidationError> {
        let doc = ImportValidator::decode_str(text)?;
        let layout_id = doc.layout_id.clone();
        self.store_imported(doc);
        self.events.push(SessionEvent::Imported {
            accepted: 1,
            skipped: 0,
        });
        Ok(layout_id)
    }

    /// Imports a bulk export file. Invalid entries are skipped and counted.
    pub fn import_all(&mut self, text: &str) -> Result<BulkImport, ValidationError> {
        let report = ImportValidator::validate_bulk_str(text)?;
        for doc in report.accepted.values() {
            self.store_imported(doc.clone());
        }
        info!(
            "bulk import stored {} layout(s), skipped {}",
            report.accepted.len(),
            report.skipped()
        );
        self.events.push(SessionEvent::Imported {
            accepted: report.accepted.len(),
            skipped: report.skipped(),
        });
        Ok(report)
    }

    fn store_imported(&mut self, doc: LayoutDocument) {
        let layout_id = doc.layout_id.clone();
        let written = match self.local.write(&doc) {
            Ok(written) => written,
            Err(err) => {
                warn!("imported layout not stored id={layout_id}: {err}");
                self.events.push(SessionEvent::SaveFailed {
                    layout_id,
                    error: err.to_string(),
                });
                return;
            }
        };
        // The imported copy is newer than anything the server sent before.
        self.server.remove(&layout_id);
        if self.channel.is_connected() {
            let message = OutboundMessage::SaveSldWidgetLayout {
                key: server_key(&layout_id),
                layout: written.clone(),
            };
            if let Err(err) = self.channel.send(message) {
                warn!("imported layout not pushed id={layout_id}: {err}");
            }
        }
        if self.layout_id.as_deref() == Some(layout_id.as_str()) {
            self.coordinator.reset();
            self.install(written, LayoutSource::LocalStore);
        }
    }

    pub fn export_current(&self, date: NaiveDate) -> Option<Result<ExportFile, LayoutError>> {
        self.document
            .as_ref()
            .map(|doc| export::export_layout(doc, date))
    }

    pub fn export_all(&mut self, date: NaiveDate) -> Result<ExportFile, LayoutError> {
        export::export_all(&mut self.local, &self.templates, date)
    }
}

fn decode_server_layout(layout_id: &str, raw: Value) -> Result<LayoutDocument, String> {
    let doc = ImportValidator::decode(raw).map_err(|err| err.to_string())?;
    if doc.layout_id != layout_id {
        return Err(LayoutError::IdMismatch {
            expected: layout_id.to_string(),
            found: doc.layout_id,
        }
        .to_string());
    }
    Ok(doc)
}
