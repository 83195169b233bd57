//! Canonical defaults for every node the editor can insert.
//!
//! All new tree nodes come from here, so an inserted node always carries the
//! full field set.

use super::model::{ConstructionPart, HealthRange, ItemEntity, Quantity, SlotEntity};

pub const DEFAULT_ITEM_NAME: &str = "New_Item";
pub const DEFAULT_SET_NAME: &str = "New_Set";
pub const DEFAULT_SLOT_NAME: &str = "New_Slot";
pub const DEFAULT_PART_NAME: &str = "New_Part";

/// Prefix of slots generated from an attachment rule.
pub const ATTACHMENT_SLOT_PREFIX: &str = "Att_";

/// Slot names offered for autocomplete before any database is loaded.
pub const DEFAULT_SLOT_NAMES: &[&str] = &[
    "GhilliHead",
    "GhilliSuit",
    "smershvest",
    "BeltLeft",
    "BeltRight",
    "Shoulder",
    "Melee",
    "Head",
    "Headgear",
    "Mask",
    "Eyewear",
    "Hands",
    "LeftHand",
    "Gloves",
    "Armband",
    "Vest",
    "SideBag",
    "Body",
    "Back",
    "Hips",
    "Legs",
    "Feet",
    "Splint_Right",
];

pub fn default_item() -> ItemEntity {
    named_item(DEFAULT_ITEM_NAME)
}

pub fn default_set() -> ItemEntity {
    named_item(DEFAULT_SET_NAME)
}

/// A default item carrying `class_name`.
pub fn named_item(class_name: &str) -> ItemEntity {
    ItemEntity {
        class_name: class_name.to_string(),
        include: String::new(),
        chance: 1.0,
        quantity: Quantity::default(),
        health: vec![HealthRange::default()],
        inventory_attachments: Vec::new(),
        inventory_cargo: Vec::new(),
        construction_parts_built: Vec::new(),
        sets: Vec::new(),
    }
}

pub fn default_slot() -> SlotEntity {
    SlotEntity {
        slot_name: DEFAULT_SLOT_NAME.to_string(),
        items: Vec::new(),
    }
}

pub fn default_part() -> ConstructionPart {
    ConstructionPart {
        part_name: DEFAULT_PART_NAME.to_string(),
    }
}

/// Slot generated for one ruled attachment: `Att_<name>` holding a single
/// default item of that class.
pub fn attachment_slot(attachment: &str) -> SlotEntity {
    SlotEntity {
        slot_name: format!("{ATTACHMENT_SLOT_PREFIX}{attachment}"),
        items: vec![named_item(attachment)],
    }
}

pub fn default_slot_names() -> Vec<String> {
    DEFAULT_SLOT_NAMES.iter().map(|s| s.to_string()).collect()
}
