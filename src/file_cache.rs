//! In-memory mirror of opened buffers plus the set of files with
//! unconsumed changes since last analysis.
//!
//! A concurrent map mutated from the editor thread and read from the
//! coordinator, backed by `dashmap` rather than a `Mutex<HashMap<..>>` so
//! readers and writers for distinct URIs don't serialize on each other.

use std::collections::HashSet;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::ReadError;
use crate::uri::DocumentUri;

#[derive(Debug, Clone)]
struct FileEntry {
    text: String,
    open: bool,
}

pub struct FileCache {
    files: DashMap<DocumentUri, FileEntry>,
    dirty: Mutex<HashSet<DocumentUri>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            dirty: Mutex::new(HashSet::new()),
        }
    }

    pub fn did_open(&self, uri: DocumentUri, text: String) {
        self.files.insert(uri.clone(), FileEntry { text, open: true });
        self.dirty.lock().insert(uri);
    }

    pub fn did_change(&self, uri: DocumentUri, text: String) {
        match self.files.get_mut(&uri) {
            Some(mut entry) => entry.text = text,
            None => {
                self.files.insert(uri.clone(), FileEntry { text, open: true });
            }
        }
        self.dirty.lock().insert(uri);
    }

    /// Marks a file closed. The core does *not* remove any derived state
    /// here -- only a workspace re-scan or explicit delete does that. The
    /// caller (LanguageService) is responsible for publishing an empty
    /// diagnostic list on close.
    pub fn did_close(&self, uri: &DocumentUri) {
        if let Some(mut entry) = self.files.get_mut(uri) {
            entry.open = false;
        }
    }

    /// Removes a URI entirely, e.g. when a workspace re-scan discovers the
    /// underlying file no longer exists.
    pub fn remove(&self, uri: &DocumentUri) {
        self.files.remove(uri);
        self.dirty.lock().remove(uri);
    }

    pub fn get_open_files(&self) -> HashSet<DocumentUri> {
        self.files
            .iter()
            .filter(|e| e.open)
            .map(|e| e.key().clone())
            .collect()
    }

    /// Returns the set of dirty URIs and atomically clears their dirty
    /// bits.
    pub fn take_dirty(&self) -> HashSet<DocumentUri> {
        std::mem::take(&mut *self.dirty.lock())
    }

    /// Read-through text access: serves the in-memory buffer if present,
    /// otherwise falls back to disk.
    pub fn read_text(&self, uri: &DocumentUri) -> Result<String, ReadError> {
        if let Some(entry) = self.files.get(uri) {
            return Ok(entry.text.clone());
        }

        let path = uri
            .to_file_path()
            .ok_or_else(|| ReadError::NotFound(uri.clone()))?;

        match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map_err(|_| ReadError::NotUtf8 { uri: uri.clone() }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(ReadError::NotFound(uri.clone()))
            }
            Err(source) => Err(ReadError::Io {
                uri: uri.clone(),
                source,
            }),
        }
    }

    pub fn contains(&self, uri: &DocumentUri) -> bool {
        self.files.contains_key(uri)
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(tower_lsp::lsp_types::Url::parse(s).unwrap())
    }

    #[test]
    fn did_open_marks_dirty_and_open() {
        let cache = FileCache::new();
        let u = uri("file:///a.nf");
        cache.did_open(u.clone(), "workflow {}".to_string());

        assert!(cache.get_open_files().contains(&u));
        let dirty = cache.take_dirty();
        assert!(dirty.contains(&u));
        assert!(cache.take_dirty().is_empty());
    }

    #[test]
    fn did_close_retains_text_but_marks_closed() {
        let cache = FileCache::new();
        let u = uri("file:///a.nf");
        cache.did_open(u.clone(), "workflow {}".to_string());
        cache.take_dirty();
        cache.did_close(&u);

        assert!(!cache.get_open_files().contains(&u));
        assert!(cache.contains(&u));
        assert_eq!(cache.read_text(&u).unwrap(), "workflow {}");
    }

    #[test]
    fn take_dirty_is_atomic() {
        let cache = FileCache::new();
        let u1 = uri("file:///a.nf");
        let u2 = uri("file:///b.nf");
        cache.did_open(u1.clone(), String::new());
        cache.did_open(u2.clone(), String::new());

        let dirty = cache.take_dirty();
        assert_eq!(dirty.len(), 2);
        assert!(cache.take_dirty().is_empty());
    }
}
