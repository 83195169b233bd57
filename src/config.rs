//! Where the editor finds its database and cache.
//!
//! The database root is resolved in this order:
//! 1. `LOADOUT_DB_ROOT`, when it names a directory;
//! 2. `database/` under the working directory;
//! 3. a `database/` directory next to the executable or any of its ancestors;
//! 4. the `LOADOUT_DB_ROOT_HINT` baked in by `build.rs`, while it still holds
//!    `types/` or `spawnable/`.

use crate::entity::factory;
use crate::ingest::{SPAWNABLE_DIR, SnapshotCache, TYPES_DIR, default_cache_path};
use anyhow::{Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DB_ROOT: &str = "LOADOUT_DB_ROOT";
pub const DATABASE_DIR: &str = "database";

fn root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let path = PathBuf::from(hint);
    if !path.is_dir() {
        return None;
    }
    fs::canonicalize(path).ok()
}

/// A baked-in hint is stale unless it still holds a scanned folder.
fn database_from_build_hint(hint: &str) -> Option<PathBuf> {
    let root = root_from_hint(hint)?;
    [TYPES_DIR, SPAWNABLE_DIR]
        .iter()
        .any(|dir| root.join(dir).is_dir())
        .then_some(root)
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(DATABASE_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

pub fn find_database_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ENV_DB_ROOT) {
        if let Some(root) = root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        let candidate = cwd.join(DATABASE_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("LOADOUT_DB_ROOT_HINT") {
        if let Some(root) = database_from_build_hint(hint) {
            return Ok(root);
        }
    }

    bail!("Unable to locate the loadout database directory. Set {ENV_DB_ROOT} to its path.");
}

/// Everything an [`crate::session::Editor`] needs from its surroundings.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub database_root: PathBuf,
    pub cache_path: PathBuf,
    pub slot_names: Vec<String>,
}

impl EditorConfig {
    pub fn new(database_root: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            database_root: database_root.into(),
            cache_path: cache_path.into(),
            slot_names: factory::default_slot_names(),
        }
    }

    /// Resolve from the environment. Explicit values win over discovery.
    pub fn resolve(database_root: Option<PathBuf>, cache_path: Option<PathBuf>) -> Result<Self> {
        let database_root = match database_root {
            Some(root) => root,
            None => find_database_root()?,
        };
        let cache_path = cache_path.unwrap_or_else(default_cache_path);
        Ok(Self::new(database_root, cache_path))
    }

    pub fn cache(&self) -> SnapshotCache {
        SnapshotCache::new(&self.cache_path)
    }
}
