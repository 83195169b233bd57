//! Loadout entities.
//!
//! A node is an item (or set) when it carries `ClassName` and a slot when it
//! carries `SlotName`; exactly one of the two may be present. The typed
//! [`Entity`] enum makes that split explicit; the editable tree itself stays
//! a [`Node`] so unknown fields in user files survive a round trip.

pub mod collection;
pub mod factory;
pub mod model;

pub use collection::{Collection, NESTED_ENTITY_COLLECTIONS, UnknownCollection};
pub use model::{ConstructionPart, HealthRange, ItemEntity, Quantity, SlotEntity};

use crate::tree::Node;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const CLASS_NAME: &str = "ClassName";
pub const SLOT_NAME: &str = "SlotName";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Item,
    Slot,
}

impl EntityKind {
    /// Classify a tree node by its discriminating field.
    pub fn of(node: &Node) -> Option<EntityKind> {
        let map = node.as_map()?;
        match (map.contains_key(CLASS_NAME), map.contains_key(SLOT_NAME)) {
            (true, _) => Some(EntityKind::Item),
            (false, true) => Some(EntityKind::Slot),
            (false, false) => None,
        }
    }

    /// Classify raw JSON, rejecting objects that carry both or neither
    /// discriminating field.
    pub fn of_value(value: &Value) -> Result<EntityKind, EntityError> {
        let Value::Object(map) = value else {
            return Err(EntityError::NotAnObject);
        };
        match (map.contains_key(CLASS_NAME), map.contains_key(SLOT_NAME)) {
            (true, true) => Err(EntityError::Ambiguous),
            (false, false) => Err(EntityError::Unidentified),
            (true, false) => Ok(EntityKind::Item),
            (false, true) => Ok(EntityKind::Slot),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "Item",
            EntityKind::Slot => "Slot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty `ClassName`, else non-empty `SlotName`.
pub fn display_name(node: &Node) -> Option<&str> {
    let class_name = node.get_key(CLASS_NAME).and_then(Node::as_str);
    let slot_name = node.get_key(SLOT_NAME).and_then(Node::as_str);
    class_name
        .filter(|name| !name.is_empty())
        .or_else(|| slot_name.filter(|name| !name.is_empty()))
}

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("entity has both ClassName and SlotName")]
    Ambiguous,
    #[error("entity has neither ClassName nor SlotName")]
    Unidentified,
    #[error("document root must be an item, found a slot")]
    SlotRoot,
    #[error("entity is not a JSON object")]
    NotAnObject,
    #[error("invalid entity fields: {0}")]
    Fields(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Item(ItemEntity),
    Slot(SlotEntity),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Item(_) => EntityKind::Item,
            Entity::Slot(_) => EntityKind::Slot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Item(item) => &item.class_name,
            Entity::Slot(slot) => &slot.slot_name,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, EntityError> {
        match EntityKind::of_value(&value)? {
            EntityKind::Item => Ok(Entity::Item(serde_json::from_value(value)?)),
            EntityKind::Slot => Ok(Entity::Slot(serde_json::from_value(value)?)),
        }
    }
}

impl From<&Entity> for Node {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Item(item) => Node::from(item),
            Entity::Slot(slot) => Node::from(slot),
        }
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Entity::from_value(value).map_err(serde::de::Error::custom)
    }
}
