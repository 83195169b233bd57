//! The loadout being edited.
//!
//! `DocumentModel` owns the root node and the focus path. Every edit is a
//! whole-tree replacement computed by [`tree::set`], so a failed edit leaves
//! the previous tree in place and unrelated branches keep their identity.

mod mutation;
mod navigation;

pub use mutation::AttachmentSuggestion;
pub use navigation::{Breadcrumb, NodeSummary};

use crate::entity::{self, Collection, EntityError, EntityKind, factory};
use crate::error::ErrorKind;
use crate::schema_loader::CompiledSchema;
use crate::tree::{self, FocusPath, Node, TreeError, Update};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

const DOCUMENT_INDENT: &[u8] = b"    ";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("selection not found at '{0}'")]
    NotFound(FocusPath),
    #[error("{found} at '{path}' has no {collection} collection")]
    WrongOwner {
        path: FocusPath,
        found: &'static str,
        collection: &'static str,
    },
    #[error("expected {expected} at '{path}', found {found}")]
    WrongKind {
        path: FocusPath,
        expected: &'static str,
        found: &'static str,
    },
    #[error("'{path}' is not an entity")]
    NotAnEntity { path: FocusPath },
    #[error("malformed document: {0}")]
    MalformedInput(String),
    #[error("serializing document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::Tree(_)
            | DocumentError::NotFound(_)
            | DocumentError::WrongOwner { .. }
            | DocumentError::WrongKind { .. }
            | DocumentError::NotAnEntity { .. } => ErrorKind::NotFound,
            DocumentError::MalformedInput(_) => ErrorKind::MalformedInput,
            DocumentError::Serialize(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<EntityError> for DocumentError {
    fn from(err: EntityError) -> Self {
        DocumentError::MalformedInput(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentModel {
    root: Node,
    focus: FocusPath,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel {
    /// A document holding one default item, focused on the root.
    pub fn new() -> Self {
        Self {
            root: Node::from(&factory::default_item()),
            focus: FocusPath::root(),
        }
    }

    /// Wrap an already-checked root.
    pub fn from_root(root: Node) -> Result<Self, DocumentError> {
        Self::check_root_value(&Value::from(&root))?;
        Ok(Self {
            root,
            focus: FocusPath::root(),
        })
    }

    /// Parse and check document text. Invalid JSON, a shape the bundled
    /// schema rejects, or a slot at the root are all `MalformedInput`.
    pub fn parse_root(text: &str) -> Result<Node, DocumentError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| DocumentError::MalformedInput(format!("invalid JSON: {err}")))?;
        Self::check_root_value(&value)?;
        Ok(Node::from(value))
    }

    /// Structural check only: the bundled schema plus the root discriminant.
    /// Any subset of item fields is accepted.
    pub fn check_root_value(value: &Value) -> Result<(), DocumentError> {
        let schema = CompiledSchema::loadout_document()
            .map_err(|err| DocumentError::MalformedInput(format!("{err:#}")))?;
        schema
            .validate(value)
            .map_err(|err| DocumentError::MalformedInput(format!("{err:#}")))?;
        match EntityKind::of_value(value)? {
            EntityKind::Item => Ok(()),
            EntityKind::Slot => Err(EntityError::SlotRoot.into()),
        }
    }

    /// Replace the whole tree from JSON text. On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), DocumentError> {
        let root = Self::parse_root(text)?;
        self.replace(root);
        Ok(())
    }

    /// Serialize with the 4-space indentation loadout files use.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(DOCUMENT_INDENT));
        self.root.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn focus(&self) -> &FocusPath {
        &self.focus
    }

    /// Replace the tree wholesale and return to the root.
    pub fn replace(&mut self, root: Node) {
        self.root = root;
        self.focus = FocusPath::root();
    }

    /// Move the focus. The document is not touched; a dangling target shows
    /// up as `NotFound` from [`DocumentModel::focused`].
    pub fn navigate(&mut self, target: FocusPath) {
        self.focus = target;
    }

    pub fn get(&self, path: &FocusPath) -> Option<&Node> {
        tree::get(&self.root, path.tokens())
    }

    pub fn focused(&self) -> Result<&Node, DocumentError> {
        self.entity_at(&self.focus)
    }

    pub fn focused_kind(&self) -> Result<EntityKind, DocumentError> {
        self.kind_at(&self.focus)
    }

    pub fn entity_at(&self, path: &FocusPath) -> Result<&Node, DocumentError> {
        self.get(path)
            .ok_or_else(|| DocumentError::NotFound(path.clone()))
    }

    pub fn kind_at(&self, path: &FocusPath) -> Result<EntityKind, DocumentError> {
        let node = self.entity_at(path)?;
        EntityKind::of(node).ok_or_else(|| DocumentError::NotAnEntity { path: path.clone() })
    }

    /// Children of `collection` under `parent`; an absent field reads as empty.
    pub fn children(&self, parent: &FocusPath, collection: Collection) -> Result<&[Node], DocumentError> {
        let node = self.entity_at(parent)?;
        match node.get_key(collection.field_name()) {
            None | Some(Node::Null) => Ok(&[]),
            Some(Node::Seq(items)) => Ok(items.as_slice()),
            Some(other) => Err(TreeError::TypeMismatch {
                path: parent.clone().key(collection.field_name()),
                expected: "sequence",
                found: other.kind_name(),
            }
            .into()),
        }
    }

    /// Write `value` at `path` as one all-or-nothing step.
    pub fn apply(&mut self, path: &FocusPath, update: impl Into<Update>) -> Result<(), DocumentError> {
        self.root = tree::set(&self.root, path.tokens(), update)?;
        Ok(())
    }

    /// Set `field` on the entity at `path`.
    pub fn update_field(
        &mut self,
        path: &FocusPath,
        field: &str,
        value: impl Into<Node>,
    ) -> Result<(), DocumentError> {
        self.entity_at(path)?;
        self.apply(&path.clone().key(field), value.into())
    }

    pub fn focused_name(&self) -> Option<&str> {
        self.focused().ok().and_then(entity::display_name)
    }
}
