use super::DatabaseSnapshot;
use crate::schema_loader::CompiledSchema;
use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ENV_CACHE_PATH: &str = "LOADOUT_CACHE_PATH";
const DEFAULT_CACHE_RELATIVE: &str = "data/db_cache.json";

/// `LOADOUT_CACHE_PATH`, else `data/db_cache.json` under the working
/// directory.
pub fn default_cache_path() -> PathBuf {
    if let Some(raw) = env::var_os(ENV_CACHE_PATH).filter(|v| !v.is_empty()) {
        return PathBuf::from(raw);
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_CACHE_RELATIVE)
}

/// Single-file persistence for the last database snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot`, creating the parent directory. The file is replaced
    /// atomically, so a failed write leaves the previous cache in place.
    pub fn store(&self, snapshot: &DatabaseSnapshot) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("creating cache directory {}", parent.display()))?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("staging cache file in {}", parent.display()))?;
        serde_json::to_writer_pretty(&mut temp, snapshot).context("serializing cache snapshot")?;
        temp.write_all(b"\n").context("writing cache snapshot")?;
        temp.persist(&self.path)
            .with_context(|| format!("replacing cache {}", self.path.display()))?;
        info!(
            "database cache saved to {} ({} unique items)",
            self.path.display(),
            snapshot.stats.types_items
        );
        Ok(())
    }

    /// Last persisted snapshot. `Ok(None)` when nothing was ever written.
    pub fn try_load(&self) -> Result<Option<DatabaseSnapshot>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading cache {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing cache {}", self.path.display()))?;
        CompiledSchema::db_cache()?.validate(&value)?;
        let snapshot = serde_json::from_value(value)
            .with_context(|| format!("decoding cache {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Like [`SnapshotCache::try_load`], but an unreadable cache counts as
    /// absent.
    pub fn load(&self) -> Option<DatabaseSnapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("ignoring database cache: {err:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ScanStats;
    use tempfile::TempDir;

    fn snapshot() -> DatabaseSnapshot {
        let mut rules = crate::ingest::AttachmentRules::new();
        rules.insert("Weapon_Glock".into(), vec!["Mag_Glock_15Rnd".into()]);
        DatabaseSnapshot {
            types_items: vec!["Ammo_9mm".into(), "Weapon_Glock".into()],
            spawnable_rules: rules,
            stats: ScanStats {
                types_files: 2,
                spawnable_files: 1,
                types_items: 2,
                spawnable_rules: 1,
            },
        }
    }

    #[test]
    fn store_then_load_round_trips_and_creates_parent() {
        let temp = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp.path().join("data/db_cache.json"));
        assert!(cache.load().is_none());
        cache.store(&snapshot()).unwrap();
        assert_eq!(cache.load(), Some(snapshot()));

        let raw = fs::read_to_string(cache.path()).unwrap();
        assert!(raw.contains("\"typesItems\""));
        assert!(raw.contains("\"spawnableFiles\": 1"));
    }

    #[test]
    fn corrupt_or_mis_shaped_cache_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db_cache.json");
        let cache = SnapshotCache::new(&path);

        fs::write(&path, "{not json").unwrap();
        assert!(cache.load().is_none());

        fs::write(&path, r#"{"typesItems": ["A"], "spawnableRules": {}}"#).unwrap();
        assert!(cache.try_load().is_err());
        assert!(cache.load().is_none());
    }
}
