use super::{DocumentError, DocumentModel};
use crate::entity::{self, Collection, EntityKind, factory};
use crate::ingest::AttachmentRules;
use crate::tree::{FocusPath, Node, Update};
use log::debug;

/// Offer to fill an empty attachment list from the attachment rule map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentSuggestion {
    pub path: FocusPath,
    pub class_name: String,
    pub attachments: Vec<String>,
}

impl AttachmentSuggestion {
    pub fn prompt(&self) -> String {
        format!("Auto-create slots for {}?", self.class_name)
    }
}

impl DocumentModel {
    fn collection_path(
        &self,
        parent: &FocusPath,
        collection: Collection,
    ) -> Result<FocusPath, DocumentError> {
        let kind = self.kind_at(parent)?;
        if kind != collection.owner() {
            return Err(DocumentError::WrongOwner {
                path: parent.clone(),
                found: kind.as_str(),
                collection: collection.field_name(),
            });
        }
        Ok(parent.clone().key(collection.field_name()))
    }

    fn checked_children(
        &self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<Vec<Node>, DocumentError> {
        let children = self.children(parent, collection)?;
        if index >= children.len() {
            return Err(DocumentError::NotFound(
                parent.clone().key(collection.field_name()).index(index),
            ));
        }
        Ok(children.to_vec())
    }

    /// Append a default child and return its index.
    pub fn add_child(&mut self, parent: &FocusPath, collection: Collection) -> Result<usize, DocumentError> {
        let target = self.collection_path(parent, collection)?;
        let mut children = self.children(parent, collection)?.to_vec();
        children.push(collection.default_child());
        let index = children.len() - 1;
        self.apply(&target, Node::seq(children))?;
        debug!("added {} #{index} under '{parent}'", collection.field_name());
        Ok(index)
    }

    /// Remove one child; later siblings shift down by one.
    pub fn delete_child(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<(), DocumentError> {
        let target = self.collection_path(parent, collection)?;
        self.checked_children(parent, collection, index)?;
        self.apply(&target.index(index), Update::Remove)
    }

    /// Insert a deep copy of child `index` right after it and return the
    /// copy's index.
    pub fn duplicate_child(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<usize, DocumentError> {
        let target = self.collection_path(parent, collection)?;
        let mut children = self.checked_children(parent, collection, index)?;
        let copy = children[index].deep_clone();
        children.insert(index + 1, copy);
        self.apply(&target, Node::seq(children))?;
        Ok(index + 1)
    }

    /// Relocate child `from` to position `to`. Returns `false` and leaves the
    /// document alone when `to` falls outside the collection.
    pub fn move_child(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        from: usize,
        to: isize,
    ) -> Result<bool, DocumentError> {
        let target = self.collection_path(parent, collection)?;
        let mut children = self.checked_children(parent, collection, from)?;
        let Ok(to) = usize::try_from(to) else {
            return Ok(false);
        };
        if to >= children.len() {
            return Ok(false);
        }
        let moved = children.remove(from);
        children.insert(to, moved);
        self.apply(&target, Node::seq(children))?;
        Ok(true)
    }

    pub fn move_child_up(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<bool, DocumentError> {
        self.move_child(parent, collection, index, index as isize - 1)
    }

    pub fn move_child_down(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<bool, DocumentError> {
        self.move_child(parent, collection, index, index as isize + 1)
    }

    /// Focus child `index` of `collection` under `parent`.
    pub fn edit_child(
        &mut self,
        parent: &FocusPath,
        collection: Collection,
        index: usize,
    ) -> Result<(), DocumentError> {
        self.checked_children(parent, collection, index)?;
        self.navigate(parent.clone().key(collection.field_name()).index(index));
        Ok(())
    }

    /// Rename construction part `index` in place.
    pub fn rename_part(
        &mut self,
        parent: &FocusPath,
        index: usize,
        part_name: &str,
    ) -> Result<(), DocumentError> {
        let target = self.collection_path(parent, Collection::ConstructionPartsBuilt)?;
        self.checked_children(parent, Collection::ConstructionPartsBuilt, index)?;
        self.apply(&target.index(index).key("PartName"), Node::from(part_name))
    }

    /// Set `ClassName` on the item at `path`. When the rules know the class
    /// and the item has no attachments yet, a suggestion is returned for the
    /// caller to confirm; nothing beyond the name is changed here.
    pub fn set_class_name(
        &mut self,
        path: &FocusPath,
        class_name: &str,
        rules: &AttachmentRules,
    ) -> Result<Option<AttachmentSuggestion>, DocumentError> {
        let kind = self.kind_at(path)?;
        if kind != EntityKind::Item {
            return Err(DocumentError::WrongKind {
                path: path.clone(),
                expected: EntityKind::Item.as_str(),
                found: kind.as_str(),
            });
        }
        self.update_field(path, entity::CLASS_NAME, class_name)?;

        let Some(attachments) = rules.get(class_name) else {
            return Ok(None);
        };
        if !self.children(path, Collection::InventoryAttachments)?.is_empty() {
            return Ok(None);
        }
        Ok(Some(AttachmentSuggestion {
            path: path.clone(),
            class_name: class_name.to_string(),
            attachments: attachments.clone(),
        }))
    }

    /// Populate `InventoryAttachments` with one `Att_<name>` slot per
    /// suggested attachment.
    pub fn apply_attachment_suggestion(
        &mut self,
        suggestion: &AttachmentSuggestion,
    ) -> Result<(), DocumentError> {
        let target = self.collection_path(&suggestion.path, Collection::InventoryAttachments)?;
        let slots = suggestion
            .attachments
            .iter()
            .map(|name| Node::from(&factory::attachment_slot(name)))
            .collect();
        self.apply(&target, Node::seq(slots))
    }

    /// Set `SlotName` on the slot at `path`.
    pub fn set_slot_name(&mut self, path: &FocusPath, slot_name: &str) -> Result<(), DocumentError> {
        let kind = self.kind_at(path)?;
        if kind != EntityKind::Slot {
            return Err(DocumentError::WrongKind {
                path: path.clone(),
                expected: EntityKind::Slot.as_str(),
                found: kind.as_str(),
            });
        }
        self.update_field(path, entity::SLOT_NAME, slot_name)
    }
}
