use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirtyState {
    #[default]
    Clean,
    Dirty,
}

/// What kind of mutation was applied to the working document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Select,
    Dimensions,
    Position,
    Add,
    Remove,
    Replace,
    Connect,
    Reset,
    Meta,
}

impl ChangeKind {
    /// Selection and dimension measurement are renderer bookkeeping, not edits.
    pub fn marks_dirty(self) -> bool {
        !matches!(self, ChangeKind::Select | ChangeKind::Dimensions)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Select => "select",
            ChangeKind::Dimensions => "dimensions",
            ChangeKind::Position => "position",
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Replace => "replace",
            ChangeKind::Connect => "connect",
            ChangeKind::Reset => "reset",
            ChangeKind::Meta => "meta",
        };
        f.write_str(name)
    }
}

/// Tracks whether the working document has edits not yet persisted.
///
/// Every dirtying change bumps `revision`. A save acknowledgement carries the
/// revision that was dispatched and only cleans the tracker when nothing
/// changed since.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    state: DirtyState,
    cause: Option<ChangeKind>,
    revision: u64,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change. Returns true if it dirtied the document.
    pub fn record(&mut self, change: ChangeKind) -> bool {
        if !change.marks_dirty() {
            return false;
        }
        self.state = DirtyState::Dirty;
        self.cause = Some(change);
        self.revision += 1;
        true
    }

    pub fn record_all(&mut self, changes: impl IntoIterator<Item = ChangeKind>) -> bool {
        changes
            .into_iter()
            .fold(false, |dirtied, change| self.record(change) || dirtied)
    }

    /// Fresh load or completed save.
    pub fn mark_clean(&mut self) {
        self.state = DirtyState::Clean;
        self.cause = None;
    }

    /// Cleans only if no change was recorded after `revision`.
    pub fn acknowledge(&mut self, revision: u64) -> bool {
        if revision == self.revision {
            self.mark_clean();
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> DirtyState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == DirtyState::Dirty
    }

    pub fn cause(&self) -> Option<ChangeKind> {
        self.cause
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
