//! Flattened search over the loadout tree and autocomplete over the
//! database indexes.

use crate::entity::{self, EntityKind, NESTED_ENTITY_COLLECTIONS};
use crate::tree::{FocusPath, Node};
use serde::Serialize;

/// Maximum hits returned by [`search`].
pub const SEARCH_LIMIT: usize = 20;
/// Queries shorter than this return nothing.
pub const MIN_QUERY_CHARS: usize = 2;
/// Maximum suggestions returned by [`autocomplete`].
pub const AUTOCOMPLETE_LIMIT: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchEntry {
    pub name: String,
    pub path: FocusPath,
    pub kind: EntityKind,
}

/// One entry per named node under `node`, in pre-order, visiting `Items`,
/// `InventoryAttachments`, `InventoryCargo` and `Sets` in that order.
pub fn flatten(node: &Node, prefix: &FocusPath) -> Vec<SearchEntry> {
    let mut out = Vec::new();
    flatten_into(node, prefix.clone(), &mut out);
    out
}

fn flatten_into(node: &Node, path: FocusPath, out: &mut Vec<SearchEntry>) {
    if let Some(name) = entity::display_name(node) {
        let has_class_name = node
            .get_key(entity::CLASS_NAME)
            .and_then(Node::as_str)
            .is_some_and(|n| !n.is_empty());
        out.push(SearchEntry {
            name: name.to_string(),
            path: path.clone(),
            kind: if has_class_name {
                EntityKind::Item
            } else {
                EntityKind::Slot
            },
        });
    }
    for collection in NESTED_ENTITY_COLLECTIONS {
        let field = collection.field_name();
        let Some(children) = node.get_key(field).and_then(Node::as_seq) else {
            continue;
        };
        for (idx, child) in children.iter().enumerate() {
            flatten_into(child, path.clone().key(field).index(idx), out);
        }
    }
}

/// Case-insensitive substring search over the whole document.
pub fn search(document: &Node, query: &str) -> Vec<SearchEntry> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    flatten(document, &FocusPath::root())
        .into_iter()
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .take(SEARCH_LIMIT)
        .collect()
}

/// Suggestions for a name field. Nothing is offered for an empty query or
/// when no index is loaded.
pub fn autocomplete<'a>(options: &'a [String], query: &str) -> Vec<&'a str> {
    if query.is_empty() || options.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    options
        .iter()
        .filter(|option| option.to_lowercase().contains(&needle))
        .take(AUTOCOMPLETE_LIMIT)
        .map(String::as_str)
        .collect()
}
