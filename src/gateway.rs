//! File-system side of the editor: document open/save and the database
//! snapshot. The editor talks to a [`PersistenceGateway`]; path selection is
//! delegated further to a [`DialogProvider`] so a desktop shell, the CLI and
//! tests can each decide where documents come from.

use crate::document::{DocumentError, DocumentModel};
use crate::error::ErrorKind;
use crate::ingest::{DatabaseSnapshot, IngestError, ScanOutcome, SnapshotCache, scan_and_persist};
use crate::tree::Node;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// File name offered by a save dialog for a document that was never saved.
pub const DEFAULT_DOCUMENT_NAME: &str = "loadout.json";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("reading {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("writing {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Read { .. } | GatewayError::Write { .. } => ErrorKind::PersistenceFailure,
            GatewayError::Document { source, .. } => source.kind(),
            GatewayError::Ingest(err) => err.kind(),
        }
    }
}

/// A document read from disk, already checked against the loadout schema.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenedDocument {
    pub path: PathBuf,
    pub root: Node,
}

/// Chooses paths for open and save. `None` means the user cancelled.
pub trait DialogProvider: Send + Sync {
    fn pick_open_path(&self) -> Option<PathBuf>;
    fn pick_save_path(&self, suggested_name: &str) -> Option<PathBuf>;
}

/// Dialogs answered up front, for non-interactive callers.
#[derive(Clone, Debug, Default)]
pub struct PresetDialogs {
    pub open: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

impl DialogProvider for PresetDialogs {
    fn pick_open_path(&self) -> Option<PathBuf> {
        self.open.clone()
    }

    fn pick_save_path(&self, _suggested_name: &str) -> Option<PathBuf> {
        self.save.clone()
    }
}

pub trait PersistenceGateway: Send + Sync {
    /// `Ok(None)` when the user cancelled.
    fn open_document(&self) -> Result<Option<OpenedDocument>, GatewayError>;
    /// Ask for a destination and write `content` there.
    fn save_document_as(&self, content: &str) -> Result<Option<PathBuf>, GatewayError>;
    fn save_document(&self, path: &Path, content: &str) -> Result<(), GatewayError>;
    fn load_index_snapshot(&self) -> Option<DatabaseSnapshot>;
    /// Scan `database_root` and persist the result as the cached snapshot.
    fn scan_and_build_index(&self, database_root: &Path) -> Result<ScanOutcome, IngestError>;
}

/// Gateway backed by the local file system.
#[derive(Debug)]
pub struct FsGateway<D> {
    dialogs: D,
    cache: SnapshotCache,
}

impl<D: DialogProvider> FsGateway<D> {
    pub fn new(dialogs: D, cache: SnapshotCache) -> Self {
        Self { dialogs, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

impl<D: DialogProvider> PersistenceGateway for FsGateway<D> {
    fn open_document(&self) -> Result<Option<OpenedDocument>, GatewayError> {
        let Some(path) = self.dialogs.pick_open_path() else {
            return Ok(None);
        };
        read_document(&path).map(Some)
    }

    fn save_document_as(&self, content: &str) -> Result<Option<PathBuf>, GatewayError> {
        let Some(path) = self.dialogs.pick_save_path(DEFAULT_DOCUMENT_NAME) else {
            return Ok(None);
        };
        self.save_document(&path, content)?;
        Ok(Some(path))
    }

    fn save_document(&self, path: &Path, content: &str) -> Result<(), GatewayError> {
        write_document(path, content).map_err(|err| GatewayError::Write {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })?;
        info!("saved document to {}", path.display());
        Ok(())
    }

    fn load_index_snapshot(&self) -> Option<DatabaseSnapshot> {
        self.cache.load()
    }

    fn scan_and_build_index(&self, database_root: &Path) -> Result<ScanOutcome, IngestError> {
        scan_and_persist(database_root, &self.cache)
    }
}

/// Read and check a loadout document.
pub fn read_document(path: &Path) -> Result<OpenedDocument, GatewayError> {
    let text = fs::read_to_string(path).map_err(|err| GatewayError::Read {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let root = DocumentModel::parse_root(&text).map_err(|source| GatewayError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    info!("opened document {}", path.display());
    Ok(OpenedDocument {
        path: path.to_path_buf(),
        root,
    })
}

/// Replace `path` with `content` through a temp file in the same directory.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("staging document in {}", parent.display()))?;
    temp.write_all(content.as_bytes())
        .context("writing document contents")?;
    temp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
