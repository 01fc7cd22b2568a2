use super::dirty::DirtyTracker;
use super::store::{LayoutStore, LocalLayouts};
use crate::channel::{LayoutChannel, OutboundMessage, server_key};
use crate::config::SessionConfig;
use crate::error::{ChannelError, PersistenceError};
use crate::model::LayoutDocument;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Manual,
    Auto,
    /// Re-sends a locally committed layout once the channel reconnects.
    Resync,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveTrigger::Manual => "manual",
            SaveTrigger::Auto => "auto",
            SaveTrigger::Resync => "resync",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Auto-save found nothing worth persisting.
    Skipped,
    /// Written locally; the channel was unavailable.
    LocalOnly { channel_error: Option<ChannelError> },
    /// Written locally and sent to the server, awaiting acknowledgement.
    Dispatched { key: String },
}

impl SaveOutcome {
    /// True when the document reached the local store.
    pub fn committed(&self) -> bool {
        !matches!(self, SaveOutcome::Skipped)
    }
}

/// A save sent to the server and not yet answered.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlightSave {
    pub key: String,
    pub revision: u64,
    pub trigger: SaveTrigger,
    pub layout: LayoutDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Idle,
    Debouncing { deadline: Instant },
    Saving,
}

/// Decides when and how the working document is written.
///
/// The local store is always written first. The channel, when connected,
/// receives the same document and answers with a key-correlated
/// acknowledgement. Auto-saves use a fixed trailing window: the deadline is
/// set by the first edit after a quiet period and later edits do not move it.
#[derive(Debug, Clone)]
pub struct PersistenceCoordinator {
    auto_save: bool,
    window: Duration,
    deadline: Option<Instant>,
    in_flight: Option<InFlightSave>,
    persisted_once: bool,
    /// A template-derived layout waits for its first auto-save window.
    first_save_pending: bool,
    unsynced: bool,
}

impl PersistenceCoordinator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            auto_save: config.auto_save && config.edit_mode,
            window: config.debounce_window(),
            deadline: None,
            in_flight: None,
            persisted_once: false,
            first_save_pending: false,
            unsynced: false,
        }
    }

    /// Forgets everything tied to the previous layout.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.in_flight = None;
        self.persisted_once = false;
        self.first_save_pending = false;
        self.unsynced = false;
    }

    pub fn phase(&self) -> SavePhase {
        if self.in_flight.is_some() {
            SavePhase::Saving
        } else if let Some(deadline) = self.deadline {
            SavePhase::Debouncing { deadline }
        } else {
            SavePhase::Idle
        }
    }

    pub fn in_flight(&self) -> Option<&InFlightSave> {
        self.in_flight.as_ref()
    }

    pub fn persisted_once(&self) -> bool {
        self.persisted_once
    }

    /// A local-only save happened that the server has not seen yet.
    pub fn needs_resync(&self) -> bool {
        self.unsynced
    }

    /// Opens the auto-save window after an edit, unless one is already open.
    pub fn schedule(&mut self, now: Instant, tracker: &DirtyTracker) {
        if self.auto_save && tracker.is_dirty() && self.deadline.is_none() {
            self.deadline = Some(now + self.window);
            debug!("auto-save scheduled in {}ms", self.window.as_millis());
        }
    }

    pub fn cancel_pending(&mut self) {
        self.deadline = None;
        self.first_save_pending = false;
    }

    /// Queues an auto-save for content that has never been written, such as
    /// a layout freshly instantiated from a template. The window opens on the
    /// next `arm_first_save`.
    pub fn request_first_save(&mut self, doc: &LayoutDocument) {
        if self.auto_save && doc.has_real_content() && !self.persisted_once {
            self.first_save_pending = true;
        }
    }

    pub fn arm_first_save(&mut self, now: Instant) {
        if self.first_save_pending && self.deadline.is_none() {
            self.first_save_pending = false;
            self.deadline = Some(now + self.window);
            debug!("first auto-save scheduled in {}ms", self.window.as_millis());
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Fires the auto-save if its window has elapsed.
    pub fn poll<S: LayoutStore, C: LayoutChannel>(
        &mut self,
        now: Instant,
        doc: &LayoutDocument,
        tracker: &mut DirtyTracker,
        store: &mut LocalLayouts<S>,
        channel: &mut C,
    ) -> Option<Result<SaveOutcome, PersistenceError>> {
        if !self.is_due(now) {
            return None;
        }
        self.deadline = None;
        Some(self.save(doc, SaveTrigger::Auto, tracker, store, channel))
    }

    pub fn save<S: LayoutStore, C: LayoutChannel>(
        &mut self,
        doc: &LayoutDocument,
        trigger: SaveTrigger,
        tracker: &mut DirtyTracker,
        store: &mut LocalLayouts<S>,
        channel: &mut C,
    ) -> Result<SaveOutcome, PersistenceError> {
        if trigger == SaveTrigger::Manual {
            self.deadline = None;
        }
        if trigger == SaveTrigger::Auto {
            let first_content = doc.has_real_content() && !self.persisted_once;
            if !tracker.is_dirty() && !first_content {
                debug!("auto-save skipped id={}: nothing to persist", doc.layout_id);
                return Ok(SaveOutcome::Skipped);
            }
        }

        let revision = tracker.revision();
        let written = store.write(doc).inspect_err(|err| {
            warn!("{trigger} save failed id={}: {err}", doc.layout_id);
        })?;
        self.persisted_once = true;
        self.first_save_pending = false;

        if !channel.is_connected() {
            info!("layout saved locally id={} trigger={trigger}", written.layout_id);
            return Ok(self.finish_local(tracker, revision, None));
        }

        let key = server_key(&written.layout_id);
        let message = OutboundMessage::SaveSldWidgetLayout {
            key: key.clone(),
            layout: written.clone(),
        };
        match channel.send(message) {
            Ok(()) => {
                info!("layout save dispatched key={key} trigger={trigger}");
                self.in_flight = Some(InFlightSave {
                    key: key.clone(),
                    revision,
                    trigger,
                    layout: written,
                });
                Ok(SaveOutcome::Dispatched { key })
            }
            Err(err) => {
                warn!("layout save not sent key={key}, kept locally: {err}");
                Ok(self.finish_local(tracker, revision, Some(err)))
            }
        }
    }

    fn finish_local(
        &mut self,
        tracker: &mut DirtyTracker,
        revision: u64,
        channel_error: Option<ChannelError>,
    ) -> SaveOutcome {
        tracker.acknowledge(revision);
        self.unsynced = true;
        SaveOutcome::LocalOnly { channel_error }
    }

    /// Completes the in-flight save when `key` matches it.
    pub fn acknowledge(&mut self, key: &str, tracker: &mut DirtyTracker) -> Option<InFlightSave> {
        if self.in_flight.as_ref().is_none_or(|f| f.key != key) {
            return None;
        }
        let done = self.in_flight.take()?;
        if !tracker.acknowledge(done.revision) {
            debug!("save acknowledged key={key} but newer edits remain");
        }
        self.unsynced = false;
        Some(done)
    }

    /// Drops the in-flight save after a server-side failure. The local copy
    /// stays committed and the document stays dirty.
    pub fn fail(&mut self, key: &str) -> Option<InFlightSave> {
        if self.in_flight.as_ref().is_none_or(|f| f.key != key) {
            return None;
        }
        self.unsynced = true;
        self.in_flight.take()
    }
}
