//! Child collections an entity can hold.
//!
//! Editing code addresses collections through this enum rather than raw
//! field strings so the owning entity kind and the default child for an
//! insert are decided in one place.

use super::EntityKind;
use super::factory;
use crate::tree::Node;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    InventoryAttachments,
    InventoryCargo,
    Sets,
    Items,
    ConstructionPartsBuilt,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

/// Traversal order used when flattening a tree.
pub const NESTED_ENTITY_COLLECTIONS: [Collection; 4] = [
    Collection::Items,
    Collection::InventoryAttachments,
    Collection::InventoryCargo,
    Collection::Sets,
];

impl Collection {
    pub fn field_name(&self) -> &'static str {
        match self {
            Collection::InventoryAttachments => "InventoryAttachments",
            Collection::InventoryCargo => "InventoryCargo",
            Collection::Sets => "Sets",
            Collection::Items => "Items",
            Collection::ConstructionPartsBuilt => "ConstructionPartsBuilt",
        }
    }

    /// Entity kind that carries this collection.
    pub fn owner(&self) -> EntityKind {
        match self {
            Collection::Items => EntityKind::Slot,
            Collection::InventoryAttachments
            | Collection::InventoryCargo
            | Collection::Sets
            | Collection::ConstructionPartsBuilt => EntityKind::Item,
        }
    }

    /// Fresh child appended by "add".
    pub fn default_child(&self) -> Node {
        match self {
            Collection::InventoryAttachments => Node::from(&factory::default_slot()),
            Collection::InventoryCargo | Collection::Items => Node::from(&factory::default_item()),
            Collection::Sets => Node::from(&factory::default_set()),
            Collection::ConstructionPartsBuilt => Node::from(&factory::default_part()),
        }
    }

    /// Short label shown in breadcrumbs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::InventoryAttachments => "Slots",
            Collection::InventoryCargo => "Cargo",
            Collection::Sets => "Sets",
            Collection::Items => "Items",
            Collection::ConstructionPartsBuilt => "ConstructionPartsBuilt",
        }
    }
}

impl TryFrom<&str> for Collection {
    type Error = UnknownCollection;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "InventoryAttachments" => Ok(Collection::InventoryAttachments),
            "InventoryCargo" => Ok(Collection::InventoryCargo),
            "Sets" => Ok(Collection::Sets),
            "Items" => Ok(Collection::Items),
            "ConstructionPartsBuilt" => Ok(Collection::ConstructionPartsBuilt),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}
