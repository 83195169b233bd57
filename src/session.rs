//! Editor session: the document, the shared database indexes and the
//! collaborators that reach outside the process.
//!
//! Every fallible operation here finishes by recording a [`Notice`]; the
//! document and indexes are left as they were when an operation fails.

use crate::config::EditorConfig;
use crate::document::{DocumentError, DocumentModel};
use crate::entity::Collection;
use crate::error::ErrorKind;
use crate::gateway::PersistenceGateway;
use crate::ingest::{IndexStore, IngestError, ScanOutcome, SyncHandle};
use crate::search::{self, SearchEntry};
use crate::tree::FocusPath;
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DELETE_PROMPT: &str = "Delete this?";

/// Yes/no questions put to the user.
pub trait Prompter {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every question the same way.
#[derive(Clone, Copy, Debug)]
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Danger => "danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

pub struct Editor {
    document: DocumentModel,
    store: Arc<IndexStore>,
    slot_names: Vec<String>,
    database_root: PathBuf,
    current_path: Option<PathBuf>,
    gateway: Arc<dyn PersistenceGateway>,
    prompter: Box<dyn Prompter>,
    notices: Vec<Notice>,
}

impl Editor {
    pub fn new(
        config: &EditorConfig,
        gateway: Arc<dyn PersistenceGateway>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        Self {
            document: DocumentModel::new(),
            store: Arc::new(IndexStore::default()),
            slot_names: config.slot_names.clone(),
            database_root: config.database_root.clone(),
            current_path: None,
            gateway,
            prompter,
            notices: Vec::new(),
        }
    }

    pub fn document(&self) -> &DocumentModel {
        &self.document
    }

    /// Direct access for edits that need no confirmation.
    pub fn document_mut(&mut self) -> &mut DocumentModel {
        &mut self.document
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Danger => error!("{message}"),
            NoticeLevel::Info | NoticeLevel::Success => info!("{message}"),
        }
        self.notices.push(Notice { level, message });
    }

    fn report(&mut self, action: &str, err: &dyn std::error::Error, kind: ErrorKind) {
        warn!("{action} failed ({kind})");
        self.notify(NoticeLevel::Danger, format!("{action}: {err}"));
    }

    /// Load the cached database snapshot, or sync when there is none.
    pub fn startup(&mut self) {
        match self.gateway.load_index_snapshot() {
            Some(snapshot) => {
                info!(
                    "loaded database cache: {} items, {} rules",
                    snapshot.stats.types_items, snapshot.stats.spawnable_rules
                );
                self.store.replace(snapshot);
            }
            None => {
                self.sync_database();
            }
        }
    }

    /// Scan the database on the calling thread and publish the result.
    pub fn sync_database(&mut self) -> Option<ScanOutcome> {
        match self.gateway.scan_and_build_index(&self.database_root) {
            Ok(outcome) => {
                self.store.replace(outcome.snapshot.clone());
                self.finish_sync(&outcome);
                Some(outcome)
            }
            Err(err) => {
                let kind = err.kind();
                warn!("sync failed ({kind}): {err}");
                self.notify(NoticeLevel::Danger, "Failed to sync database");
                None
            }
        }
    }

    /// Start a sync on a worker thread. The document stays editable and the
    /// indexes are swapped only once the scan completes; pass the handle to
    /// [`Editor::finish_background_sync`] to collect the notice.
    pub fn start_sync(&self) -> SyncHandle {
        let gateway = Arc::clone(&self.gateway);
        let root = self.database_root.clone();
        self.store
            .spawn_publish(move || gateway.scan_and_build_index(&root))
    }

    pub fn finish_background_sync(&mut self, handle: SyncHandle) -> Option<ScanOutcome> {
        match handle.wait() {
            Ok(outcome) => {
                self.finish_sync(&outcome);
                Some(outcome)
            }
            Err(err) => {
                warn!("background sync failed: {err}");
                self.notify(NoticeLevel::Danger, "Failed to sync database");
                None
            }
        }
    }

    fn finish_sync(&mut self, outcome: &ScanOutcome) {
        for problem in &outcome.report.problems {
            if let IngestError::Persistence { .. } = problem {
                self.notify(NoticeLevel::Danger, problem.to_string());
            }
        }
        self.notify(
            NoticeLevel::Success,
            format!(
                "Sync Successful! {} items imported.",
                outcome.snapshot.stats.types_items
            ),
        );
    }

    /// Replace the item name index from one type-definition file.
    pub fn import_types_file(&mut self, path: &Path) -> bool {
        match self.store.import_types_file(path) {
            Ok(count) => {
                self.notify(NoticeLevel::Success, format!("Loaded {count} item types"));
                true
            }
            Err(err) => {
                let kind = err.kind();
                self.report("Error parsing XML", &err, kind);
                false
            }
        }
    }

    /// Replace the attachment rule map from one spawn-rule file.
    pub fn import_spawnable_file(&mut self, path: &Path) -> bool {
        match self.store.import_spawnable_file(path) {
            Ok(count) => {
                self.notify(
                    NoticeLevel::Success,
                    format!("Loaded attachment rules for {count} items"),
                );
                true
            }
            Err(err) => {
                let kind = err.kind();
                self.report("Error parsing XML", &err, kind);
                false
            }
        }
    }

    pub fn open(&mut self) -> bool {
        match self.gateway.open_document() {
            Ok(Some(opened)) => {
                self.document.replace(opened.root);
                let name = opened
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| opened.path.display().to_string());
                self.current_path = Some(opened.path);
                self.notify(NoticeLevel::Success, format!("Loaded {name}"));
                true
            }
            Ok(None) => false,
            Err(err) => {
                let kind = err.kind();
                self.report("Open error", &err, kind);
                false
            }
        }
    }

    /// Save to the current path, or ask for one when the document has none.
    pub fn save(&mut self) -> bool {
        let Some(path) = self.current_path.clone() else {
            return self.save_as();
        };
        let Some(content) = self.export_json() else {
            return false;
        };
        match self.gateway.save_document(&path, &content) {
            Ok(()) => {
                self.notify(NoticeLevel::Success, "Saved successfully");
                true
            }
            Err(err) => {
                let kind = err.kind();
                self.report("Save failed", &err, kind);
                false
            }
        }
    }

    pub fn save_as(&mut self) -> bool {
        let Some(content) = self.export_json() else {
            return false;
        };
        match self.gateway.save_document_as(&content) {
            Ok(Some(path)) => {
                self.current_path = Some(path);
                self.notify(NoticeLevel::Success, "File saved");
                true
            }
            Ok(None) => false,
            Err(err) => {
                let kind = err.kind();
                self.report("Save failed", &err, kind);
                false
            }
        }
    }

    pub fn import_json(&mut self, text: &str) -> bool {
        match self.document.import_json(text) {
            Ok(()) => {
                self.notify(NoticeLevel::Success, "Imported successfully");
                true
            }
            Err(err) => {
                warn!("import rejected: {err}");
                self.notify(NoticeLevel::Danger, "Invalid JSON format");
                false
            }
        }
    }

    pub fn export_json(&mut self) -> Option<String> {
        match self.document.to_json_pretty() {
            Ok(text) => Some(text),
            Err(err) => {
                let kind = err.kind();
                self.report("Export failed", &err, kind);
                None
            }
        }
    }

    /// Delete a child after the user confirms.
    pub fn delete_child(&mut self, parent: &FocusPath, collection: Collection, index: usize) -> bool {
        if !self.prompter.confirm(DELETE_PROMPT) {
            return false;
        }
        let result = self.document.delete_child(parent, collection, index);
        self.settle("Delete failed", result)
    }

    /// Set a class name and, when the attachment rules know the class and
    /// the user agrees, create its attachment slots.
    pub fn set_class_name(&mut self, path: &FocusPath, class_name: &str) -> bool {
        let snapshot = self.store.snapshot();
        let suggestion = match self
            .document
            .set_class_name(path, class_name, &snapshot.spawnable_rules)
        {
            Ok(suggestion) => suggestion,
            Err(err) => {
                let kind = err.kind();
                self.report("Update failed", &err, kind);
                return false;
            }
        };
        if let Some(suggestion) = suggestion {
            if self.prompter.confirm(&suggestion.prompt()) {
                let result = self.document.apply_attachment_suggestion(&suggestion);
                return self.settle("Update failed", result);
            }
        }
        true
    }

    fn settle(&mut self, action: &str, result: Result<(), DocumentError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                let kind = err.kind();
                self.report(action, &err, kind);
                false
            }
        }
    }

    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        search::search(self.document.root(), query)
    }

    /// Focus a search hit or breadcrumb.
    pub fn navigate(&mut self, target: FocusPath) {
        self.document.navigate(target);
    }

    pub fn class_name_suggestions(&self, query: &str) -> Vec<String> {
        let snapshot = self.store.snapshot();
        search::autocomplete(&snapshot.types_items, query)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn slot_name_suggestions(&self, query: &str) -> Vec<String> {
        search::autocomplete(&self.slot_names, query)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
