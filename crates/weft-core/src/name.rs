//! Qualified names and structural index paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dotted name such as `net.example.Expressions`.
///
/// Serialized as its dotted string form so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    /// Parse a dotted name. Empty segments are dropped.
    pub fn parse(text: &str) -> Self {
        Self(
            text.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_qualified(&self) -> bool {
        self.0.len() > 1
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Last segment, i.e. the simple name.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Everything but the last segment.
    pub fn parent(&self) -> QualifiedName {
        match self.0.split_last() {
            Some((_, rest)) => Self(rest.to_vec()),
            None => Self::default(),
        }
    }

    pub fn child(&self, segment: &str) -> QualifiedName {
        let mut parts = self.0.clone();
        parts.push(segment.to_owned());
        Self(parts)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.to_string()
    }
}

/// Position of a rule item relative to its rule root.
///
/// The root item of every rule is `[0]`; children append their position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexPath(Vec<u32>);

impl IndexPath {
    pub fn root() -> Self {
        Self(vec![0])
    }

    pub fn child(&self, index: u32) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Final component, the position among siblings.
    pub fn last(&self) -> u32 {
        self.0.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for IndexPath {
    fn from(value: Vec<u32>) -> Self {
        Self(value)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }
        f.write_str("]")
    }
}
