use super::{DocumentError, DocumentModel};
use crate::entity::{self, Collection, EntityKind, NESTED_ENTITY_COLLECTIONS};
use crate::tree::{self, FocusPath, Node, PathToken};
use serde::Serialize;

const ROOT_LABEL: &str = "Root";
const UNNAMED: &str = "Unnamed";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: FocusPath,
}

/// What the editor header shows for one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub kind: EntityKind,
    pub chance_percent: Option<u32>,
    pub counts: Vec<String>,
    pub depth: usize,
}

impl DocumentModel {
    /// Crumbs from the root to the focus. Each crumb navigates to the prefix
    /// of the focus path ending at its token.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            label: ROOT_LABEL.to_string(),
            path: FocusPath::root(),
        }];
        for prefix in self.focus().prefixes().skip(1) {
            let label = match prefix.last() {
                Some(PathToken::Key(key)) => Collection::try_from(key.as_str())
                    .map(|collection| collection.label().to_string())
                    .unwrap_or_else(|_| key.clone()),
                Some(PathToken::Index(idx)) => tree::get(self.root(), prefix.tokens())
                    .and_then(entity::display_name)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{idx}")),
                None => continue,
            };
            crumbs.push(Breadcrumb {
                label,
                path: prefix,
            });
        }
        crumbs
    }

    pub fn summary(&self, path: &FocusPath) -> Result<NodeSummary, DocumentError> {
        let kind = self.kind_at(path)?;
        let node = self.entity_at(path)?;
        let name = entity::display_name(node).unwrap_or(UNNAMED).to_string();
        let chance_percent = match kind {
            EntityKind::Item => node
                .get_key("Chance")
                .and_then(Node::as_f64)
                .map(|chance| (chance * 100.0).round().max(0.0) as u32),
            EntityKind::Slot => None,
        };
        let counts = NESTED_ENTITY_COLLECTIONS
            .into_iter()
            .filter(|collection| collection.owner() == kind)
            .map(|collection| {
                let count = node
                    .get_key(collection.field_name())
                    .and_then(Node::as_seq)
                    .map_or(0, <[Node]>::len);
                format!("{count} {}", collection.label())
            })
            .collect();
        Ok(NodeSummary {
            name,
            kind,
            chance_percent,
            counts,
            depth: path.len() / 2,
        })
    }

    pub fn focused_summary(&self) -> Result<NodeSummary, DocumentError> {
        self.summary(self.focus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DocumentModel {
        DocumentModel::from_root(Node::from(json!({
            "ClassName": "Survivor",
            "Chance": 0.35,
            "InventoryAttachments": [
                {"SlotName": "Back", "Items": [{"ClassName": "TaloonBag", "Chance": 1.0}]},
                {"SlotName": "", "Items": [{"ClassName": ""}]}
            ],
            "InventoryCargo": [],
            "Sets": [{"ClassName": "Kit"}]
        })))
        .unwrap()
    }

    fn labels(doc: &DocumentModel) -> Vec<String> {
        doc.breadcrumbs().into_iter().map(|c| c.label).collect()
    }

    #[test]
    fn breadcrumbs_label_collections_and_children() {
        let mut doc = sample();
        assert_eq!(labels(&doc), vec!["Root"]);

        doc.navigate("InventoryAttachments/0/Items/0".parse().unwrap());
        assert_eq!(labels(&doc), vec!["Root", "Slots", "Back", "Items", "TaloonBag"]);
        let crumbs = doc.breadcrumbs();
        assert_eq!(crumbs[2].path.to_string(), "InventoryAttachments/0");

        doc.navigate("InventoryAttachments/1/Items/0".parse().unwrap());
        assert_eq!(labels(&doc), vec!["Root", "Slots", "#1", "Items", "#0"]);
    }

    #[test]
    fn summary_reports_name_chance_counts_and_depth() {
        let doc = sample();
        let root = doc.summary(&FocusPath::root()).unwrap();
        assert_eq!(root.name, "Survivor");
        assert_eq!(root.chance_percent, Some(35));
        assert_eq!(root.counts, vec!["2 Slots", "0 Cargo", "1 Sets"]);
        assert_eq!(root.depth, 0);

        let slot = doc.summary(&"InventoryAttachments/1".parse().unwrap()).unwrap();
        assert_eq!(slot.kind, EntityKind::Slot);
        assert_eq!(slot.name, "Unnamed");
        assert_eq!(slot.chance_percent, None);
        assert_eq!(slot.counts, vec!["1 Items"]);
        assert_eq!(slot.depth, 1);
    }

    #[test]
    fn summary_of_missing_node_is_not_found() {
        let doc = sample();
        assert!(doc.summary(&"Sets/9".parse().unwrap()).is_err());
    }
}
