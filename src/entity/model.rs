use serde::{Deserialize, Deserializer, Serialize, de};

use crate::tree::{Map, Node};

fn default_chance() -> f64 {
    1.0
}

fn one() -> u32 {
    1
}

fn full_health() -> f64 {
    1.0
}

/// Counts written as `2` or `2.0`; game files use both.
fn whole_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if raw < 0.0 || raw.fract() != 0.0 || raw > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!("expected a whole count, found {raw}")));
    }
    Ok(raw as u32)
}

/// Spawnable item or set. Sets share the item shape and differ only in how
/// the loadout consumes them (pick one of several alternatives).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemEntity {
    pub class_name: String,
    #[serde(default)]
    pub include: String,
    #[serde(default = "default_chance")]
    pub chance: f64,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub health: Vec<HealthRange>,
    #[serde(default)]
    pub inventory_attachments: Vec<SlotEntity>,
    #[serde(default)]
    pub inventory_cargo: Vec<ItemEntity>,
    #[serde(default)]
    pub construction_parts_built: Vec<ConstructionPart>,
    #[serde(default)]
    pub sets: Vec<ItemEntity>,
}

/// Named attachment point holding candidate items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlotEntity {
    pub slot_name: String,
    #[serde(default)]
    pub items: Vec<ItemEntity>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quantity {
    #[serde(default = "one", deserialize_with = "whole_count")]
    pub min: u32,
    #[serde(default = "one", deserialize_with = "whole_count")]
    pub max: u32,
}

impl Default for Quantity {
    fn default() -> Self {
        Self { min: 1, max: 1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthRange {
    #[serde(default = "full_health")]
    pub min: f64,
    #[serde(default = "full_health")]
    pub max: f64,
    #[serde(default)]
    pub zone: String,
}

impl Default for HealthRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            zone: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConstructionPart {
    #[serde(default)]
    pub part_name: String,
}

// Node lowering is spelled out so field order matches what the game's own
// loadout files use.

impl From<&ItemEntity> for Node {
    fn from(item: &ItemEntity) -> Self {
        let mut map = Map::new();
        map.insert("ClassName".into(), Node::from(item.class_name.as_str()));
        map.insert("Include".into(), Node::from(item.include.as_str()));
        map.insert("Chance".into(), Node::from(item.chance));
        map.insert("Quantity".into(), Node::from(&item.quantity));
        map.insert(
            "Health".into(),
            Node::seq(item.health.iter().map(Node::from).collect()),
        );
        map.insert(
            "InventoryAttachments".into(),
            Node::seq(item.inventory_attachments.iter().map(Node::from).collect()),
        );
        map.insert(
            "InventoryCargo".into(),
            Node::seq(item.inventory_cargo.iter().map(Node::from).collect()),
        );
        map.insert(
            "ConstructionPartsBuilt".into(),
            Node::seq(item.construction_parts_built.iter().map(Node::from).collect()),
        );
        map.insert(
            "Sets".into(),
            Node::seq(item.sets.iter().map(Node::from).collect()),
        );
        Node::map(map)
    }
}

impl From<&SlotEntity> for Node {
    fn from(slot: &SlotEntity) -> Self {
        let mut map = Map::new();
        map.insert("SlotName".into(), Node::from(slot.slot_name.as_str()));
        map.insert(
            "Items".into(),
            Node::seq(slot.items.iter().map(Node::from).collect()),
        );
        Node::map(map)
    }
}

impl From<&Quantity> for Node {
    fn from(quantity: &Quantity) -> Self {
        let mut map = Map::new();
        map.insert("Min".into(), Node::from(u64::from(quantity.min)));
        map.insert("Max".into(), Node::from(u64::from(quantity.max)));
        Node::map(map)
    }
}

impl From<&HealthRange> for Node {
    fn from(health: &HealthRange) -> Self {
        let mut map = Map::new();
        map.insert("Min".into(), Node::from(health.min));
        map.insert("Max".into(), Node::from(health.max));
        map.insert("Zone".into(), Node::from(health.zone.as_str()));
        Node::map(map)
    }
}

impl From<&ConstructionPart> for Node {
    fn from(part: &ConstructionPart) -> Self {
        let mut map = Map::new();
        map.insert("PartName".into(), Node::from(part.part_name.as_str()));
        Node::map(map)
    }
}
