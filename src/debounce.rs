//! Keyed debounced executor: `schedule` cancels whatever was previously
//! pending for a key and schedules a fresh delayed run, backed by
//! `DashMap<K, JoinHandle<()>>` with cancellation via `JoinHandle::abort`.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

pub struct Debouncer<K: Eq + Hash + Clone + Send + Sync + 'static> {
    pending: DashMap<K, JoinHandle<()>>,
    delay: Duration,
}

impl<K: Eq + Hash + Clone + Send + Sync + 'static> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            delay,
        }
    }

    /// Cancels any previously scheduled run for `key` and schedules a new
    /// one `delay` from now.
    pub fn schedule<F, Fut>(self: &Arc<Self>, key: K, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        if let Some((_, handle)) = self.pending.remove(&key) {
            handle.abort();
        }
        let delay = self.delay;
        let this = Arc::clone(self);
        let key_for_cleanup = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task().await;
            this.pending.remove(&key_for_cleanup);
        });
        self.pending.insert(key, handle);
    }

    /// Cancels whatever is pending for `key`, if anything, without
    /// running it. Returns whether a run was actually cancelled.
    pub fn cancel(&self, key: &K) -> bool {
        if let Some((_, handle)) = self.pending.remove(key) {
            handle.abort();
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}
