//! Core of the loadout editor: a persistent document tree for spawn loadout
//! files, the edit operations over it, and ingestion of the server's item
//! database that feeds name autocomplete and attachment suggestions.

pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod ingest;
mod schema_loader;
pub mod search;
pub mod session;
pub mod tree;

pub use config::{EditorConfig, find_database_root};
pub use document::{DocumentError, DocumentModel};
pub use entity::{Collection, Entity, EntityKind};
pub use error::ErrorKind;
pub use gateway::{FsGateway, PersistenceGateway, PresetDialogs};
pub use ingest::{DatabaseSnapshot, IndexStore, SnapshotCache};
pub use session::{Editor, Notice, NoticeLevel, Prompter};
pub use tree::{FocusPath, Node, PathToken};
