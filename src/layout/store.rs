use crate::error::{LayoutError, PersistenceError, StoreError};
use crate::model::LayoutDocument;
use itertools::Itertools;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of local store keys (`sldLayout_<layoutId>`).
pub const STORE_KEY_PREFIX: &str = "sldLayout_";

pub fn store_key(layout_id: &str) -> String {
    format!("{STORE_KEY_PREFIX}{layout_id}")
}

/// A raw string key/value store, the local durability floor.
pub trait LayoutStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Directory-backed store: one `<key>.json` file per entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|err| StoreError::Io {
            key: root.display().to_string(),
            message: err.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys are percent-encoded into file names, so any layout id maps to a
    /// single file inside `root`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let file_stem = utf8_percent_encode(key, FILE_NAME_ENCODE_SET);
        Ok(self.root.join(format!("{file_stem}.json")))
    }
}

/// Everything except ASCII alphanumerics, `_` and `-` is escaped, including
/// `.` and path separators.
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

fn io_error(key: &str, err: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        message: err.to_string(),
    }
}

impl LayoutStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| io_error(key, err))?;
        fs::rename(&tmp, &path).map_err(|err| io_error(key, err))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key, err)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|err| io_error("*", err))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| io_error("*", err))?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match percent_decode_str(stem).decode_utf8() {
                Ok(key) => keys.push(key.into_owned()),
                Err(err) => debug!("skipping undecodable store file {stem}: {err}"),
            }
        }
        Ok(keys)
    }
}

/// Typed layout access over a raw `LayoutStore`.
#[derive(Debug, Clone, Default)]
pub struct LocalLayouts<S> {
    store: S,
}

impl<S: LayoutStore> LocalLayouts<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads and checks the stored document without modifying the store.
    pub fn read(&self, layout_id: &str) -> Result<Option<LayoutDocument>, LayoutError> {
        let key = store_key(layout_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("local layout read failed key={key}: {err}");
                return Ok(None);
            }
        };
        decode_stored(layout_id, &raw).map(Some)
    }

    /// Loads the stored document, purging the entry when it is corrupt.
    pub fn load(&mut self, layout_id: &str) -> Option<LayoutDocument> {
        match self.read(layout_id) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("discarding corrupt local layout id={layout_id}: {err}");
                let key = store_key(layout_id);
                if let Err(err) = self.store.remove(&key) {
                    warn!("failed to purge corrupt layout key={key}: {err}");
                }
                None
            }
        }
    }

    /// Writes `doc` without its placeholder node. Metadata fields that are
    /// stored but absent from `doc` are kept. Returns the document as written.
    pub fn write(&mut self, doc: &LayoutDocument) -> Result<LayoutDocument, PersistenceError> {
        let mut doc = doc.without_placeholder();
        if let Ok(Some(stored)) = self.read(&doc.layout_id) {
            doc.meta.merge_missing_from(&stored.meta);
        }
        let text = serde_json::to_string(&doc).map_err(|err| LayoutError::SerializeError {
            layout_id: doc.layout_id.clone(),
            message: err.to_string(),
        })?;
        self.store.set(&store_key(&doc.layout_id), &text)?;
        debug!(
            "local layout written id={} nodes={} edges={}",
            doc.layout_id,
            doc.nodes.len(),
            doc.edges.len()
        );
        Ok(doc)
    }

    pub fn remove(&mut self, layout_id: &str) -> Result<(), StoreError> {
        self.store.remove(&store_key(layout_id))
    }

    /// Ids of every stored layout, sorted.
    pub fn layout_ids(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| key.strip_prefix(STORE_KEY_PREFIX))
                .map(str::to_string)
                .sorted()
                .collect(),
            Err(err) => {
                warn!("listing local layouts failed: {err}");
                Vec::new()
            }
        }
    }

    /// Every valid stored layout. Corrupt entries are purged on the way.
    pub fn all(&mut self) -> BTreeMap<String, LayoutDocument> {
        self.layout_ids()
            .into_iter()
            .filter_map(|id| self.load(&id).map(|doc| (id, doc)))
            .collect()
    }
}

fn decode_stored(layout_id: &str, raw: &str) -> Result<LayoutDocument, LayoutError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| LayoutError::JsonParseError {
        layout_id: layout_id.to_string(),
        message: err.to_string(),
    })?;
    let embedded = value.get("layoutId").and_then(Value::as_str).unwrap_or("");
    if embedded != layout_id {
        return Err(LayoutError::IdMismatch {
            expected: layout_id.to_string(),
            found: embedded.to_string(),
        });
    }
    if !value.get("nodes").is_some_and(Value::is_array) {
        return Err(LayoutError::NodesNotAList(layout_id.to_string()));
    }
    serde_json::from_value(value).map_err(|err| LayoutError::JsonParseError {
        layout_id: layout_id.to_string(),
        message: err.to_string(),
    })
}
