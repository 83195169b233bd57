//! Shared, atomically replaced database indexes.
//!
//! Readers grab the current snapshot and keep it for as long as they like;
//! a sync builds a complete replacement off-thread and publishes it with a
//! single store, so nobody observes a half-built index. A sync that fails or
//! is abandoned never touches the published snapshot or the cache file.

use super::scanner::{
    MarkupScanner, ScanOutcome, scan_database, scan_spawnable_file, scan_types_file,
};
use super::{AttachmentRules, DatabaseLayout, DatabaseSnapshot, IngestError, SnapshotCache};
use arc_swap::ArcSwap;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Default)]
pub struct IndexStore {
    current: ArcSwap<DatabaseSnapshot>,
}

impl IndexStore {
    pub fn new(snapshot: DatabaseSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn snapshot(&self) -> Arc<DatabaseSnapshot> {
        self.current.load_full()
    }

    pub fn replace(&self, snapshot: DatabaseSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Swap in a new item name index, keeping the attachment rules.
    pub fn replace_items(&self, items: Vec<String>, files: usize) {
        self.current
            .rcu(|old| Arc::new(old.with_items(items.clone(), files)));
    }

    /// Swap in new attachment rules, keeping the item name index.
    pub fn replace_rules(&self, rules: AttachmentRules, files: usize) {
        self.current
            .rcu(|old| Arc::new(old.with_rules(rules.clone(), files)));
    }

    /// Replace the item name index from a single type-definition file.
    /// Returns the number of names loaded.
    pub fn import_types_file(&self, path: &Path) -> Result<usize, IngestError> {
        let items = scan_types_file(path, &MarkupScanner::new()?)?;
        let count = items.len();
        info!("imported {count} item names from {}", path.display());
        self.replace_items(items, 1);
        Ok(count)
    }

    /// Replace the attachment rule map from a single spawn-rule file.
    pub fn import_spawnable_file(&self, path: &Path) -> Result<usize, IngestError> {
        let rules = scan_spawnable_file(path, &MarkupScanner::new()?)?;
        let count = rules.len();
        info!("imported {count} attachment rules from {}", path.display());
        self.replace_rules(rules, 1);
        Ok(count)
    }

    /// Scan, persist and publish, blocking the caller. A cache write failure
    /// is added to the report; the fresh snapshot is still published.
    pub fn sync(&self, database_root: &Path, cache: &SnapshotCache) -> Result<ScanOutcome, IngestError> {
        let outcome = scan_and_persist(database_root, cache)?;
        self.replace(outcome.snapshot.clone());
        Ok(outcome)
    }

    /// Run [`IndexStore::sync`] on a worker thread.
    pub fn spawn_sync(self: &Arc<Self>, database_root: &Path, cache: &SnapshotCache) -> SyncHandle {
        let root = database_root.to_path_buf();
        let cache = cache.clone();
        self.spawn_publish(move || scan_and_persist(&root, &cache))
    }

    /// Run `build` on a worker thread and publish its snapshot when it
    /// succeeds. An error leaves the current snapshot in place.
    pub fn spawn_publish<F>(self: &Arc<Self>, build: F) -> SyncHandle
    where
        F: FnOnce() -> Result<ScanOutcome, IngestError> + Send + 'static,
    {
        let store = Arc::clone(self);
        let handle = thread::spawn(move || {
            let outcome = build()?;
            store.replace(outcome.snapshot.clone());
            Ok(outcome)
        });
        SyncHandle { handle }
    }
}

/// Scan `database_root` and write the result to `cache` without publishing
/// it anywhere.
pub fn scan_and_persist(database_root: &Path, cache: &SnapshotCache) -> Result<ScanOutcome, IngestError> {
    info!("syncing database from {}", database_root.display());
    let scanner = MarkupScanner::new()?;
    let mut outcome = scan_database(&DatabaseLayout::new(database_root), &scanner);
    if let Err(err) = cache.store(&outcome.snapshot) {
        warn!("failed to save database cache: {err:#}");
        outcome.report.problems.push(IngestError::Persistence {
            path: cache.path().to_path_buf(),
            reason: format!("{err:#}"),
        });
    }
    Ok(outcome)
}

/// In-flight background sync.
#[derive(Debug)]
pub struct SyncHandle {
    handle: JoinHandle<Result<ScanOutcome, IngestError>>,
}

impl SyncHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker is done.
    pub fn wait(self) -> Result<ScanOutcome, IngestError> {
        self.handle.join().map_err(|_| IngestError::WorkerLost)?
    }
}
