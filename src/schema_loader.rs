//! Bundled JSON Schemas and a small compiled-validator wrapper.
//!
//! Two contracts ship with the crate: the structural shape of a loadout
//! document and the layout of the database cache snapshot. Both are
//! compiled from embedded text, so validation never depends on files next
//! to the binary.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

pub(crate) const LOADOUT_DOCUMENT_SCHEMA: &str =
    include_str!("../schema/loadout_document.schema.json");
pub(crate) const DB_CACHE_SCHEMA: &str = include_str!("../schema/db_cache.schema.json");

/// Result of compiling one embedded schema.
pub(crate) struct CompiledSchema {
    name: &'static str,
    compiled: JSONSchema,
}

impl CompiledSchema {
    pub(crate) fn load(name: &'static str, text: &str) -> Result<Self> {
        let raw: Value =
            serde_json::from_str(text).with_context(|| format!("parsing schema {name}"))?;
        let compiled = JSONSchema::compile(&raw)
            .map_err(|err| anyhow!("compiling schema {name}: {err}"))?;
        Ok(Self { name, compiled })
    }

    pub(crate) fn loadout_document() -> Result<Self> {
        Self::load("loadout_document", LOADOUT_DOCUMENT_SCHEMA)
    }

    pub(crate) fn db_cache() -> Result<Self> {
        Self::load("db_cache", DB_CACHE_SCHEMA)
    }

    /// Validate `instance`, joining every violation into one error.
    pub(crate) fn validate(&self, instance: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| format!("{} at '{}'", err, err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{} validation failed:\n{}", self.name, details);
        }
        Ok(())
    }
}
