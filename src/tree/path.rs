use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One dereference step: a field name or a sequence index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathToken {
    Key(String),
    Index(usize),
}

impl From<&str> for PathToken {
    fn from(value: &str) -> Self {
        PathToken::Key(value.to_string())
    }
}

impl From<String> for PathToken {
    fn from(value: String) -> Self {
        PathToken::Key(value)
    }
}

impl From<usize> for PathToken {
    fn from(value: usize) -> Self {
        PathToken::Index(value)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Key(key) => f.write_str(key),
            PathToken::Index(idx) => write!(f, "{idx}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToken {
    Index(usize),
    Key(String),
}

impl Serialize for PathToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathToken::Key(key) => serializer.serialize_str(key),
            PathToken::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

impl<'de> Deserialize<'de> for PathToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawToken::deserialize(deserializer)? {
            RawToken::Index(idx) => PathToken::Index(idx),
            RawToken::Key(key) => PathToken::Key(key),
        })
    }
}

/// Location of a node relative to the document root.
///
/// Displays as `/`-separated segments (`InventoryAttachments/0/Items/1`)
/// and serializes as a mixed string/integer JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusPath(Vec<PathToken>);

impl FocusPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, token: impl Into<PathToken>) {
        self.0.push(token.into());
    }

    /// Extend by one field name.
    pub fn key(mut self, key: &str) -> Self {
        self.0.push(PathToken::Key(key.to_string()));
        self
    }

    /// Extend by one sequence index.
    pub fn index(mut self, idx: usize) -> Self {
        self.0.push(PathToken::Index(idx));
        self
    }

    pub fn parent(&self) -> Option<FocusPath> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    pub fn last(&self) -> Option<&PathToken> {
        self.0.last()
    }

    /// Every prefix including the root and `self`, shortest first.
    pub fn prefixes(&self) -> impl Iterator<Item = FocusPath> + '_ {
        (0..=self.0.len()).map(|end| Self(self.0[..end].to_vec()))
    }
}

impl AsRef<[PathToken]> for FocusPath {
    fn as_ref(&self) -> &[PathToken] {
        &self.0
    }
}

impl From<Vec<PathToken>> for FocusPath {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<PathToken> for FocusPath {
    fn from_iter<I: IntoIterator<Item = PathToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FocusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl FromStr for FocusPath {
    type Err = std::convert::Infallible;

    /// Numeric segments become indices; empty segments are skipped so `""`
    /// and `"/"` both name the root.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(raw
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(idx) => PathToken::Index(idx),
                Err(_) => PathToken::Key(segment.to_string()),
            })
            .collect())
    }
}
