//! Path-addressed reads and copy-on-write updates over a [`Node`] tree.
//!
//! `get` short-circuits to `None` on the first missing step. `set` never
//! touches its input: it rebuilds only the containers along the path and
//! shares every other branch with the original tree.

pub mod node;
pub mod path;

pub use node::{Map, Node};
pub use path::{FocusPath, PathToken};

use std::sync::Arc;
use thiserror::Error;

/// What `set` writes at the end of the path.
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Replace(Node),
    /// Delete the addressed element. On a sequence the tail shifts down.
    Remove,
}

impl From<Node> for Update {
    fn from(node: Node) -> Self {
        Update::Replace(node)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    #[error("no node at '{path}'")]
    NotFound { path: FocusPath },
    #[error("'{path}' is a {found}, expected a {expected}")]
    TypeMismatch {
        path: FocusPath,
        expected: &'static str,
        found: &'static str,
    },
    #[error("the document root cannot be removed")]
    RemoveRoot,
}

/// Resolve `path` from `root`.
pub fn get<'a>(root: &'a Node, path: &[PathToken]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, token| node.child(token))
}

/// Return a new tree with `update` applied at `path`.
///
/// An empty path replaces the whole tree. The final step may name an absent
/// key (it is inserted) or the index one past the end of a sequence (it is
/// appended); every earlier step must already resolve.
pub fn set(root: &Node, path: &[PathToken], update: impl Into<Update>) -> Result<Node, TreeError> {
    set_at(root, path, 0, update.into())
}

fn set_at(node: &Node, full: &[PathToken], depth: usize, update: Update) -> Result<Node, TreeError> {
    let Some(token) = full.get(depth) else {
        return match update {
            Update::Replace(value) => Ok(value),
            Update::Remove => Err(TreeError::RemoveRoot),
        };
    };
    let is_last = depth + 1 == full.len();
    let here = || FocusPath::new(full[..=depth].to_vec());

    match (node, token) {
        (Node::Map(map), PathToken::Key(key)) => {
            let mut next: Map = map.as_ref().clone();
            if is_last {
                match update {
                    Update::Replace(value) => {
                        next.insert(key.clone(), value);
                    }
                    Update::Remove => {
                        if next.shift_remove(key.as_str()).is_none() {
                            return Err(TreeError::NotFound { path: here() });
                        }
                    }
                }
            } else {
                let child = map
                    .get(key.as_str())
                    .ok_or_else(|| TreeError::NotFound { path: here() })?;
                let rebuilt = set_at(child, full, depth + 1, update)?;
                next.insert(key.clone(), rebuilt);
            }
            Ok(Node::Map(Arc::new(next)))
        }
        (Node::Seq(items), PathToken::Index(idx)) => {
            let idx = *idx;
            let mut next: Vec<Node> = items.as_ref().clone();
            if is_last {
                match update {
                    Update::Replace(value) if idx < next.len() => next[idx] = value,
                    Update::Replace(value) if idx == next.len() => next.push(value),
                    Update::Remove if idx < next.len() => {
                        next.remove(idx);
                    }
                    _ => return Err(TreeError::NotFound { path: here() }),
                }
            } else {
                let child = items
                    .get(idx)
                    .ok_or_else(|| TreeError::NotFound { path: here() })?;
                next[idx] = set_at(child, full, depth + 1, update)?;
            }
            Ok(Node::Seq(Arc::new(next)))
        }
        (other, PathToken::Key(_)) => Err(TreeError::TypeMismatch {
            path: FocusPath::new(full[..depth].to_vec()),
            expected: "mapping",
            found: other.kind_name(),
        }),
        (other, PathToken::Index(_)) => Err(TreeError::TypeMismatch {
            path: FocusPath::new(full[..depth].to_vec()),
            expected: "sequence",
            found: other.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Node {
        Node::from(json!({
            "ClassName": "A",
            "Sets": [],
            "InventoryCargo": [
                {"ClassName": "Bandage", "InventoryCargo": []},
                {"ClassName": "Canteen", "InventoryCargo": []},
                {"ClassName": "Apple", "InventoryCargo": []}
            ],
            "InventoryAttachments": [
                {"SlotName": "Back", "Items": [{"ClassName": "Pack"}]}
            ]
        }))
    }

    fn path(raw: &str) -> FocusPath {
        raw.parse().unwrap()
    }

    #[test]
    fn get_short_circuits_on_missing_steps() {
        let root = doc();
        assert_eq!(
            get(&root, path("InventoryCargo/1/ClassName").tokens()).and_then(Node::as_str),
            Some("Canteen")
        );
        assert!(get(&root, path("InventoryCargo/7/ClassName").tokens()).is_none());
        assert!(get(&root, path("Missing/0/ClassName").tokens()).is_none());
        assert!(get(&root, path("ClassName/0").tokens()).is_none());
    }

    #[test]
    fn write_then_read_returns_value() {
        let root = doc();
        let target = path("InventoryAttachments/0/Items/0/ClassName");
        let updated = set(&root, target.tokens(), Node::from("Backpack_Green")).unwrap();
        assert_eq!(
            get(&updated, target.tokens()),
            Some(&Node::from("Backpack_Green"))
        );
    }

    #[test]
    fn set_leaves_input_untouched_and_shares_siblings() {
        let root = doc();
        let before = root.deep_clone();
        let updated = set(&root, path("InventoryCargo/0/ClassName").tokens(), Node::from("Rag")).unwrap();

        assert_eq!(root, before);
        assert!(!updated.same_ref(&root));

        let old_slots = get(&root, path("InventoryAttachments").tokens()).unwrap();
        let new_slots = get(&updated, path("InventoryAttachments").tokens()).unwrap();
        assert!(new_slots.same_ref(old_slots));

        let old_second = get(&root, path("InventoryCargo/1").tokens()).unwrap();
        let new_second = get(&updated, path("InventoryCargo/1").tokens()).unwrap();
        assert!(new_second.same_ref(old_second));
        assert_eq!(
            get(&updated, path("InventoryCargo/2/ClassName").tokens()),
            get(&root, path("InventoryCargo/2/ClassName").tokens())
        );
    }

    #[test]
    fn remove_on_index_shifts_tail() {
        let root = doc();
        let updated = set(&root, path("InventoryCargo/0").tokens(), Update::Remove).unwrap();
        let names: Vec<&str> = get(&updated, path("InventoryCargo").tokens())
            .and_then(Node::as_seq)
            .unwrap()
            .iter()
            .filter_map(|n| n.get_key("ClassName").and_then(Node::as_str))
            .collect();
        assert_eq!(names, vec!["Canteen", "Apple"]);
    }

    #[test]
    fn empty_path_replaces_document() {
        let root = doc();
        let replacement = Node::from(json!({"ClassName": "B"}));
        assert_eq!(set(&root, &[], replacement.clone()).unwrap(), replacement);
        assert_eq!(set(&root, &[], Update::Remove), Err(TreeError::RemoveRoot));
    }

    #[test]
    fn appends_at_len_and_rejects_beyond() {
        let root = doc();
        let appended = set(&root, path("Sets/0").tokens(), Node::from(json!({"ClassName": "New_Set"}))).unwrap();
        assert_eq!(
            get(&appended, path("Sets/0/ClassName").tokens()).and_then(Node::as_str),
            Some("New_Set")
        );
        assert!(matches!(
            set(&root, path("Sets/1").tokens(), Node::Null),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            set(&root, path("Missing/0/ClassName").tokens(), Node::Null),
            Err(TreeError::NotFound { .. })
        ));
    }

    #[test]
    fn sets_example_reads_back_default_name() {
        let root = Node::from(json!({"ClassName": "A", "Sets": []}));
        let sets = Node::from(json!([{"ClassName": "New_Set"}]));
        let updated = set(&root, path("Sets").tokens(), sets).unwrap();
        assert_eq!(
            get(&updated, path("Sets/0/ClassName").tokens()),
            Some(&Node::from("New_Set"))
        );
    }

    #[test]
    fn descending_into_scalar_is_type_mismatch() {
        let root = doc();
        let err = set(&root, path("ClassName/Inner").tokens(), Node::Null).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { expected: "mapping", .. }));
    }
}
