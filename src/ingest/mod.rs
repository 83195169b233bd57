//! Server database ingestion.
//!
//! Scans two directories of markup files under a database root (`types/`
//! and `spawnable/`) with tolerant pattern extraction and produces the item
//! name index plus the attachment rule map that back autocomplete. Results
//! are persisted as a single cache snapshot and swapped into the shared
//! [`IndexStore`] in one step.

pub mod cache;
pub mod scanner;
pub mod store;

pub use cache::{SnapshotCache, default_cache_path};
pub use scanner::{
    MarkupScanner, ScanOutcome, ScanReport, scan_database, scan_spawnable_file, scan_types_file,
};
pub use store::{IndexStore, SyncHandle, scan_and_persist};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sub-directory holding type-definition files.
pub const TYPES_DIR: &str = "types";
/// Sub-directory holding spawn-rule files.
pub const SPAWNABLE_DIR: &str = "spawnable";
/// Only files with this suffix are scanned.
pub const MARKUP_SUFFIX: &str = ".xml";

/// Class name to the attachment class names ruled for it.
pub type AttachmentRules = BTreeMap<String, Vec<String>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub types_files: usize,
    pub spawnable_files: usize,
    pub types_items: usize,
    pub spawnable_rules: usize,
}

/// Combined result of one ingestion run; also the persisted cache layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSnapshot {
    pub types_items: Vec<String>,
    pub spawnable_rules: AttachmentRules,
    pub stats: ScanStats,
}

impl DatabaseSnapshot {
    pub fn is_empty(&self) -> bool {
        self.types_items.is_empty() && self.spawnable_rules.is_empty()
    }

    pub fn attachments_for(&self, class_name: &str) -> Option<&[String]> {
        self.spawnable_rules.get(class_name).map(Vec::as_slice)
    }

    /// Replace the item name index, keeping the rules.
    pub fn with_items(&self, items: Vec<String>, files: usize) -> Self {
        let mut next = self.clone();
        next.stats.types_items = items.len();
        next.stats.types_files = files;
        next.types_items = items;
        next
    }

    /// Replace the attachment rules, keeping the item index.
    pub fn with_rules(&self, rules: AttachmentRules, files: usize) -> Self {
        let mut next = self.clone();
        next.stats.spawnable_rules = rules.len();
        next.stats.spawnable_files = files;
        next.spawnable_rules = rules;
        next
    }
}

/// Directory layout of a server database root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseLayout {
    root: PathBuf,
}

impl DatabaseLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn types_dir(&self) -> PathBuf {
        self.root.join(TYPES_DIR)
    }

    pub fn spawnable_dir(&self) -> PathBuf {
        self.root.join(SPAWNABLE_DIR)
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("scan directory {} does not exist", path.display())]
    MissingDirectory { path: PathBuf },
    #[error("cannot list {}: {reason}", path.display())]
    UnreadableDirectory { path: PathBuf, reason: String },
    #[error("skipped {}: {reason}", path.display())]
    MalformedSourceFile { path: PathBuf, reason: String },
    #[error("cache {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("database sync worker stopped before finishing")]
    WorkerLost,
}
