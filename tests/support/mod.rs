#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Temporary database root with types/ and spawnable/ populated per test.
pub struct DatabaseFixture {
    temp: TempDir,
}

impl DatabaseFixture {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("failed to allocate temp database")?;
        fs::create_dir_all(temp.path().join("database/types"))?;
        fs::create_dir_all(temp.path().join("database/spawnable"))?;
        Ok(Self { temp })
    }

    /// Fixture without the two scan directories.
    pub fn bare() -> Result<Self> {
        let temp = TempDir::new().context("failed to allocate temp database")?;
        fs::create_dir_all(temp.path().join("database"))?;
        Ok(Self { temp })
    }

    pub fn workspace(&self) -> &Path {
        self.temp.path()
    }

    pub fn root(&self) -> PathBuf {
        self.temp.path().join("database")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.temp.path().join("data/db_cache.json")
    }

    pub fn write_types(&self, name: &str, contents: &str) -> Result<PathBuf> {
        self.write("types", name, contents.as_bytes())
    }

    pub fn write_spawnable(&self, name: &str, contents: &str) -> Result<PathBuf> {
        self.write("spawnable", name, contents.as_bytes())
    }

    pub fn write_raw(&self, dir: &str, name: &str, contents: &[u8]) -> Result<PathBuf> {
        self.write(dir, name, contents)
    }

    fn write(&self, dir: &str, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.root().join(dir).join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}

pub const GLOCK_RULES: &str = r#"<spawnabletypes>
  <type name="Weapon_Glock">
    <attachments chance="1.0">
      <item name="Mag_Glock_15Rnd" chance="1.0"/>
      <item name="Suppressor_Glock" chance="0.3"/>
    </attachments>
  </type>
</spawnabletypes>
"#;

pub fn sample_document() -> Value {
    json!({
        "ClassName": "Survivor_Hunter",
        "Include": "",
        "Chance": 1.0,
        "Quantity": {"Min": 1, "Max": 1},
        "Health": [{"Min": 0.7, "Max": 1.0, "Zone": ""}],
        "InventoryAttachments": [
            {
                "SlotName": "Back",
                "Items": [
                    {"ClassName": "TaloonBag_Blue", "Chance": 0.5},
                    {"ClassName": "HuntingBag", "Chance": 0.5}
                ]
            },
            {
                "SlotName": "Body",
                "Items": [{"ClassName": "HuntingJacket_Brown", "InventoryCargo": [
                    {"ClassName": "Ammo_308Win"}
                ]}]
            }
        ],
        "InventoryCargo": [{"ClassName": "Apple", "Chance": 0.25}],
        "ConstructionPartsBuilt": [],
        "Sets": [{"ClassName": "HunterKit", "InventoryCargo": [{"ClassName": "Knife"}]}]
    })
}

pub fn write_document(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("failed to write document {}", path.display()))?;
    Ok(path)
}
