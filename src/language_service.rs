//! LanguageService coordinator: owns the `FileCache` and `AstCache`,
//! exposes the editor-facing operations, and debounces analysis behind
//! `updateLater`/`updateNow`/`awaitUpdate`.
//!
//! Waiting callers use an async `tokio::sync::Notify` rather than a
//! condvar, since the ambient binding is `tower-lsp`'s async handlers --
//! see DESIGN.md's Open Question #1 resolution for the exact
//! `awaitUpdate` contract this implements.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::ast_cache::AstCache;
use crate::config::AnalyzerConfig;
use crate::debounce::Debouncer;
use crate::file_cache::FileCache;
use crate::uri::DocumentUri;
use crate::workspace_scan;

/// This DSL debounces the whole workspace as one unit rather than per
/// file: include resolution is a cross-file fixpoint anyway, so
/// re-analyzing one file in isolation would just be redone on the next
/// batch that touches its includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WorkspaceKey;

pub struct LanguageService {
    pub file_cache: Arc<FileCache>,
    pub ast_cache: Arc<AstCache>,
    config: Mutex<AnalyzerConfig>,
    debouncer: Arc<Debouncer<WorkspaceKey>>,
    notify: Arc<Notify>,
    last_changed: Mutex<HashSet<DocumentUri>>,
}

impl LanguageService {
    pub fn new(config: AnalyzerConfig) -> Self {
        let file_cache = Arc::new(FileCache::new());
        let ast_cache = Arc::new(AstCache::new(Arc::clone(&file_cache)));
        let delay = Duration::from_millis(config.debounce_millis);
        Self {
            file_cache,
            ast_cache,
            config: Mutex::new(config),
            debouncer: Arc::new(Debouncer::new(delay)),
            notify: Arc::new(Notify::new()),
            last_changed: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.config.lock().clone()
    }

    /// Replaces the live config, e.g. once `initialize`'s
    /// `initializationOptions` have been parsed. Does not retroactively
    /// change the debounce delay of a run already scheduled.
    pub fn set_config(&self, config: AnalyzerConfig) {
        *self.config.lock() = config;
    }

    /// Scans `root` for analyzable files and runs a full
    /// analysis synchronously before handing control back to the editor.
    /// Files already open in `FileCache` are left untouched -- only their
    /// dirty bit is set, so in-memory edits win over what's on disk.
    pub fn initialize(&self, root: &Path) {
        let excludes = self.config.lock().excludes.clone();
        let found = workspace_scan::scan(root, &excludes);
        info!("workspace scan found {} file(s) under {:?}", found.len(), root);

        let mut dirty = HashSet::new();
        for path in found {
            if let Some(uri) = DocumentUri::from_file_path(&path) {
                if !self.file_cache.contains(&uri) {
                    if let Ok(text) = self.file_cache.read_text(&uri) {
                        self.file_cache.did_change(uri.clone(), text);
                    }
                }
                dirty.insert(uri);
            }
        }
        self.run_update(dirty);
    }

    pub fn did_open(&self, uri: DocumentUri, text: String) {
        self.file_cache.did_open(uri, text);
        self.update_later();
    }

    pub fn did_change(&self, uri: DocumentUri, text: String) {
        self.file_cache.did_change(uri, text);
        self.update_later();
    }

    /// Closing a file does not drop its `SourceUnit` -- only marks it
    /// closed in `FileCache`. The caller still needs to clear that URI's
    /// published diagnostics, which is an LSP-boundary concern, not this
    /// method's.
    pub fn did_close(&self, uri: &DocumentUri) {
        self.file_cache.did_close(uri);
        self.update_later();
    }

    /// Schedules a debounced re-analysis, cancelling any run already
    /// pending.
    pub fn update_later(&self) {
        let ast_cache = Arc::clone(&self.ast_cache);
        let file_cache = Arc::clone(&self.file_cache);
        let notify = Arc::clone(&self.notify);
        self.debouncer.schedule(WorkspaceKey, move || async move {
            let dirty = file_cache.take_dirty();
            if dirty.is_empty() {
                return;
            }
            let _changed = ast_cache.analyze(&dirty);
            notify.notify_waiters();
        });
    }

    /// Cancels any pending debounce and runs analysis immediately,
    /// returning the URIs whose analysis result changed.
    pub fn update_now(&self) -> HashSet<DocumentUri> {
        self.debouncer.cancel(&WorkspaceKey);
        let dirty = self.file_cache.take_dirty();
        self.run_update(dirty)
    }

    fn run_update(&self, dirty: HashSet<DocumentUri>) -> HashSet<DocumentUri> {
        if dirty.is_empty() {
            return HashSet::new();
        }
        let changed = self.ast_cache.analyze(&dirty);
        *self.last_changed.lock() = changed.clone();
        self.notify.notify_waiters();
        changed
    }

    /// Waits for the next `update()` to complete, best-effort: returns
    /// once notified or after `2 * debounceMillis`, whichever comes
    /// first. A timeout is not an error -- per DESIGN.md's resolved Open
    /// Question, the caller simply proceeds with whatever snapshot is
    /// currently in `AstCache`, which may be momentarily stale.
    pub async fn await_update(&self) {
        let timeout = {
            let config = self.config.lock();
            Duration::from_millis(config.debounce_millis.saturating_mul(2))
        };
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
    }
}
